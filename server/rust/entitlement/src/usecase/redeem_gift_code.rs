use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::entity::{GiftCode, RedeemAttempt, Redemption};
use crate::domain::repository::GiftCodeRepository;

#[derive(Debug, thiserror::Error)]
pub enum RedeemGiftCodeError {
    #[error("gift code not found")]
    NotFound,

    #[error("gift code already redeemed")]
    AlreadyRedeemed,

    #[error("gift code expired")]
    Expired,

    #[error("internal error: {0}")]
    Internal(String),
}

/// RedeemGiftCodeUseCase はギフトコードをユーザーのサブスクリプションに一度だけ適用する。
///
/// 事前チェックはエラー種別を決めるためだけに使い、実際の状態遷移は
/// `GiftCodeRepository::try_redeem` の条件付き更新 1 回で行う。
pub struct RedeemGiftCodeUseCase {
    repo: Arc<dyn GiftCodeRepository>,
}

impl RedeemGiftCodeUseCase {
    pub fn new(repo: Arc<dyn GiftCodeRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        raw_code: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, RedeemGiftCodeError> {
        let code = GiftCode::normalize(raw_code);
        if code.is_empty() {
            return Err(RedeemGiftCodeError::NotFound);
        }

        let gift = self
            .repo
            .find_by_code(&code)
            .await
            .map_err(|e| RedeemGiftCodeError::Internal(e.to_string()))?
            .ok_or(RedeemGiftCodeError::NotFound)?;

        if gift.redeemed {
            debug!(code = %GiftCode::masked(&code), user_id, "gift code already redeemed");
            return Err(RedeemGiftCodeError::AlreadyRedeemed);
        }

        if gift.is_expired(now) {
            return Err(RedeemGiftCodeError::Expired);
        }

        // 事前チェック後の競合や失効は条件付き更新の結果で判定する
        let attempt = self
            .repo
            .try_redeem(&code, user_id, now)
            .await
            .map_err(|e| RedeemGiftCodeError::Internal(e.to_string()))?;
        let redemption = match attempt {
            RedeemAttempt::Redeemed(redemption) => redemption,
            RedeemAttempt::AlreadyRedeemed => return Err(RedeemGiftCodeError::AlreadyRedeemed),
            RedeemAttempt::Expired => return Err(RedeemGiftCodeError::Expired),
            RedeemAttempt::NotFound => return Err(RedeemGiftCodeError::NotFound),
        };

        info!(
            code = %GiftCode::masked(&code),
            user_id,
            tier = %redemption.tier,
            subscription_tier = %redemption.subscription_tier,
            duration_months = redemption.duration_months,
            "gift code redeemed"
        );
        Ok(redemption)
    }
}
