pub mod check_entitlement;
pub mod create_gift_code;
pub mod list_flags;
pub mod redeem_gift_code;
pub mod set_user_tier;
pub mod update_flag;

pub use check_entitlement::CheckEntitlementUseCase;
pub use create_gift_code::CreateGiftCodeUseCase;
pub use list_flags::ListFlagsUseCase;
pub use redeem_gift_code::RedeemGiftCodeUseCase;
pub use set_user_tier::SetUserTierUseCase;
pub use update_flag::UpdateFlagUseCase;
