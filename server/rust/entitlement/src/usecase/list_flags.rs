use std::sync::Arc;

use crate::domain::entity::{ContentFlag, FlagFilter};
use crate::domain::repository::FlagRepository;

#[derive(Debug, thiserror::Error)]
pub enum ListFlagsError {
    #[error("internal error: {0}")]
    Internal(String),
}

pub struct ListFlagsUseCase {
    repo: Arc<dyn FlagRepository>,
}

impl ListFlagsUseCase {
    pub fn new(repo: Arc<dyn FlagRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, filter: &FlagFilter) -> Result<Vec<ContentFlag>, ListFlagsError> {
        self.repo
            .find_all(filter)
            .await
            .map_err(|e| ListFlagsError::Internal(e.to_string()))
    }
}
