use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entity::{Identity, LimitField, Tier, TierName, UsagePeriod};
use crate::domain::repository::{SubscriptionRepository, UsageRepository};
use crate::domain::service::EntitlementGate;

#[derive(Debug, thiserror::Error)]
pub enum CheckEntitlementError {
    #[error("internal error: {0}")]
    Internal(String),
}

/// 当月のドリーム作成クォータの状況。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementSummary {
    pub tier: TierName,
    pub period: String,
    pub used: u64,
    /// 無制限の場合は None。
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub unlimited: bool,
    pub allowed: bool,
}

/// CheckEntitlementUseCase は呼び出し元が次のドリームを作成できるかを判定する。
/// 利用量の書き込みは行わない。
pub struct CheckEntitlementUseCase {
    subscription_repo: Arc<dyn SubscriptionRepository>,
    usage_repo: Arc<dyn UsageRepository>,
}

impl CheckEntitlementUseCase {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRepository>,
        usage_repo: Arc<dyn UsageRepository>,
    ) -> Self {
        Self {
            subscription_repo,
            usage_repo,
        }
    }

    pub async fn execute(
        &self,
        caller: &Identity,
        now: DateTime<Utc>,
    ) -> Result<EntitlementSummary, CheckEntitlementError> {
        let tier = self
            .subscription_repo
            .find_by_user(&caller.id)
            .await
            .map_err(|e| CheckEntitlementError::Internal(e.to_string()))?
            .map_or(TierName::Free, |sub| sub.effective_tier(now));

        let period = UsagePeriod::monthly(now);
        let used = self
            .usage_repo
            .get_usage_count(&caller.id, &period)
            .await
            .map_err(|e| CheckEntitlementError::Internal(e.to_string()))?;

        let field = LimitField::DreamsPerMonth;
        let unlimited = Tier::is_unlimited(tier, field);
        let limit = if unlimited {
            None
        } else {
            u64::try_from(Tier::limit_for(tier, field)).ok()
        };
        let allowed = EntitlementGate::can_create_dream(tier, used, caller.is_admin());

        tracing::debug!(
            user_id = %caller.id,
            tier = %tier,
            period = %period,
            used,
            allowed,
            "entitlement checked"
        );

        Ok(EntitlementSummary {
            tier,
            period: period.to_string(),
            used,
            limit,
            remaining: limit.map(|l| l.saturating_sub(used)),
            unlimited,
            allowed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Role, Subscription};
    use crate::domain::repository::subscription_repository::MockSubscriptionRepository;
    use crate::domain::repository::usage_repository::MockUsageRepository;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn usage(count: u64) -> MockUsageRepository {
        let mut mock = MockUsageRepository::new();
        mock.expect_get_usage_count()
            .withf(|user_id, period| user_id == "user-1" && period.as_str() == "2026-10")
            .returning(move |_, _| Ok(count));
        mock
    }

    fn subscription(sub: Option<Subscription>) -> MockSubscriptionRepository {
        let mut mock = MockSubscriptionRepository::new();
        mock.expect_find_by_user()
            .returning(move |_| Ok(sub.clone()));
        mock
    }

    #[tokio::test]
    async fn test_free_user_under_limit() {
        let uc = CheckEntitlementUseCase::new(Arc::new(subscription(None)), Arc::new(usage(4)));
        let summary = uc
            .execute(&Identity::new("user-1", Role::User), now())
            .await
            .unwrap();

        assert_eq!(summary.tier, TierName::Free);
        assert_eq!(summary.period, "2026-10");
        assert_eq!(summary.limit, Some(5));
        assert_eq!(summary.remaining, Some(1));
        assert!(summary.allowed);
    }

    #[tokio::test]
    async fn test_free_user_at_limit_is_blocked() {
        let uc = CheckEntitlementUseCase::new(Arc::new(subscription(None)), Arc::new(usage(5)));
        let summary = uc
            .execute(&Identity::new("user-1", Role::User), now())
            .await
            .unwrap();

        assert!(!summary.allowed);
        assert_eq!(summary.remaining, Some(0));
    }

    #[tokio::test]
    async fn test_admin_bypasses_limit() {
        let uc = CheckEntitlementUseCase::new(Arc::new(subscription(None)), Arc::new(usage(5)));
        let summary = uc
            .execute(&Identity::new("user-1", Role::Admin), now())
            .await
            .unwrap();

        assert_eq!(summary.tier, TierName::Free);
        assert!(summary.allowed);
    }

    #[tokio::test]
    async fn test_premium_is_unlimited() {
        let sub = Subscription {
            user_id: "user-1".to_string(),
            tier: TierName::Premium,
            expires_at: Some(now() + Duration::days(30)),
            updated_at: now(),
        };
        let uc = CheckEntitlementUseCase::new(
            Arc::new(subscription(Some(sub))),
            Arc::new(usage(1_000_000_000)),
        );
        let summary = uc
            .execute(&Identity::new("user-1", Role::User), now())
            .await
            .unwrap();

        assert_eq!(summary.tier, TierName::Premium);
        assert!(summary.unlimited);
        assert_eq!(summary.limit, None);
        assert_eq!(summary.remaining, None);
        assert!(summary.allowed);
    }

    #[tokio::test]
    async fn test_expired_subscription_falls_back_to_free() {
        let sub = Subscription {
            user_id: "user-1".to_string(),
            tier: TierName::Pro,
            expires_at: Some(now() - Duration::seconds(1)),
            updated_at: now() - Duration::days(30),
        };
        let uc = CheckEntitlementUseCase::new(Arc::new(subscription(Some(sub))), Arc::new(usage(10)));
        let summary = uc
            .execute(&Identity::new("user-1", Role::User), now())
            .await
            .unwrap();

        assert_eq!(summary.tier, TierName::Free);
        assert!(!summary.allowed);
    }

    #[tokio::test]
    async fn test_repository_error_is_internal() {
        let mut subs = MockSubscriptionRepository::new();
        subs.expect_find_by_user()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));
        let uc = CheckEntitlementUseCase::new(Arc::new(subs), Arc::new(MockUsageRepository::new()));

        let result = uc.execute(&Identity::new("user-1", Role::User), now()).await;
        assert!(matches!(result, Err(CheckEntitlementError::Internal(_))));
    }
}
