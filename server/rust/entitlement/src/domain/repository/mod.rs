pub mod flag_repository;
pub mod gift_code_repository;
pub mod subscription_repository;
pub mod usage_repository;

pub use flag_repository::FlagRepository;
pub use gift_code_repository::GiftCodeRepository;
pub use subscription_repository::SubscriptionRepository;
pub use usage_repository::UsageRepository;
