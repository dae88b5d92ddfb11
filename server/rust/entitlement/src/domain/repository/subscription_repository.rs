use async_trait::async_trait;

use crate::domain::entity::Subscription;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// ユーザーのサブスクリプションを取得する。未登録なら None（free 扱い）。
    async fn find_by_user(&self, user_id: &str) -> anyhow::Result<Option<Subscription>>;

    async fn upsert(&self, subscription: &Subscription) -> anyhow::Result<()>;
}
