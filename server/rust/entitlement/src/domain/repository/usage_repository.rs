use async_trait::async_trait;

use crate::domain::entity::UsagePeriod;

/// クォータ対象アクションの利用回数を提供する。書き込みは呼び出し側の責務。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageRepository: Send + Sync {
    async fn get_usage_count(&self, user_id: &str, period: &UsagePeriod) -> anyhow::Result<u64>;
}
