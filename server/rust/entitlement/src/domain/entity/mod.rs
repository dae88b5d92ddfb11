pub mod content_flag;
pub mod gift_code;
pub mod identity;
pub mod subscription;
pub mod tier;
pub mod usage;

pub use content_flag::{ContentFlag, FlagFilter, FlagStatus};
pub use gift_code::{GiftCode, RedeemAttempt, Redemption};
pub use identity::{Identity, Role};
pub use subscription::Subscription;
pub use tier::{InvalidTier, LimitField, Tier, TierLimits, TierName, UNLIMITED};
pub use usage::UsagePeriod;
