use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::entity::{ContentFlag, FlagStatus};
use crate::domain::repository::FlagRepository;

#[derive(Debug, thiserror::Error)]
pub enum UpdateFlagError {
    #[error("flag not found: {0}")]
    NotFound(Uuid),

    #[error("internal error: {0}")]
    Internal(String),
}

/// UpdateFlagUseCase は通報の審査状態を変更する（管理者専用）。
pub struct UpdateFlagUseCase {
    repo: Arc<dyn FlagRepository>,
}

impl UpdateFlagUseCase {
    pub fn new(repo: Arc<dyn FlagRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        id: &Uuid,
        status: FlagStatus,
        actor_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ContentFlag, UpdateFlagError> {
        let flag = self
            .repo
            .update_status(id, status, now)
            .await
            .map_err(|e| UpdateFlagError::Internal(e.to_string()))?
            .ok_or(UpdateFlagError::NotFound(*id))?;

        info!(flag_id = %flag.id, status = flag.status.as_str(), actor_id, "content flag updated");
        Ok(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::flag_repository::MockFlagRepository;

    #[tokio::test]
    async fn test_update_success() {
        let now = Utc::now();
        let mut flag = ContentFlag::new("dream-1", "user-2", "spam", now);
        let id = flag.id;
        flag.status = FlagStatus::Dismissed;

        let mut mock = MockFlagRepository::new();
        mock.expect_update_status()
            .withf(move |flag_id, status, _| *flag_id == id && *status == FlagStatus::Dismissed)
            .once()
            .returning(move |_, _, _| Ok(Some(flag.clone())));

        let uc = UpdateFlagUseCase::new(Arc::new(mock));
        let updated = uc
            .execute(&id, FlagStatus::Dismissed, "admin-1", now)
            .await
            .unwrap();
        assert_eq!(updated.status, FlagStatus::Dismissed);
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let mut mock = MockFlagRepository::new();
        mock.expect_update_status().returning(|_, _, _| Ok(None));

        let uc = UpdateFlagUseCase::new(Arc::new(mock));
        let id = Uuid::new_v4();
        let result = uc.execute(&id, FlagStatus::Reviewed, "admin-1", Utc::now()).await;
        assert!(matches!(result, Err(UpdateFlagError::NotFound(missing)) if missing == id));
    }
}
