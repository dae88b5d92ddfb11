use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{ContentFlag, FlagFilter, FlagStatus};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlagRepository: Send + Sync {
    /// フィルタに一致する通報を作成日時の昇順で返す。
    async fn find_all(&self, filter: &FlagFilter) -> anyhow::Result<Vec<ContentFlag>>;

    /// 通報のステータスを更新する。存在しない場合は None。
    async fn update_status(
        &self,
        id: &Uuid,
        status: FlagStatus,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<ContentFlag>>;
}
