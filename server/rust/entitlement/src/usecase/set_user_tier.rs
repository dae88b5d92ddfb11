use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::entity::{Subscription, TierName};
use crate::domain::repository::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct SetUserTierInput {
    pub tier: TierName,
    /// None は期限なし。
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum SetUserTierError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// SetUserTierUseCase は管理者がユーザーのティアを直接設定する。
pub struct SetUserTierUseCase {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SetUserTierUseCase {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        user_id: &str,
        input: &SetUserTierInput,
        actor_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Subscription, SetUserTierError> {
        if user_id.trim().is_empty() {
            return Err(SetUserTierError::Validation(
                "user_id must not be empty".to_string(),
            ));
        }
        if input.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(SetUserTierError::Validation(
                "expires_at must be in the future".to_string(),
            ));
        }

        let subscription = Subscription {
            user_id: user_id.to_string(),
            tier: input.tier,
            // free に期限は意味を持たない
            expires_at: if input.tier.is_paid() {
                input.expires_at
            } else {
                None
            },
            updated_at: now,
        };

        self.repo
            .upsert(&subscription)
            .await
            .map_err(|e| SetUserTierError::Internal(e.to_string()))?;

        info!(
            user_id,
            actor_id,
            tier = %subscription.tier,
            "user tier updated by admin"
        );
        Ok(subscription)
    }
}
