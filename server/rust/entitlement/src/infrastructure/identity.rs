use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::entity::Identity;
use crate::infrastructure::config::IdentityConfig;

/// IdentityProvider はベアラートークンから呼び出し元（ID とロール）を解決する。
/// 本番では外部 ID プロバイダーの実装を注入する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 解決できないトークンは None。プロバイダー障害のみ Err とする。
    async fn resolve(&self, bearer_token: &str) -> anyhow::Result<Option<Identity>>;
}

/// 設定ファイルの静的トークン表で解決する開発用プロバイダー。
pub struct StaticTokenIdentityProvider {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenIdentityProvider {
    pub fn new(tokens: impl IntoIterator<Item = (String, Identity)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn from_config(cfg: &IdentityConfig) -> Self {
        Self::new(
            cfg.tokens
                .iter()
                .map(|t| (t.token.clone(), Identity::new(t.user_id.clone(), t.role))),
        )
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentityProvider {
    async fn resolve(&self, bearer_token: &str) -> anyhow::Result<Option<Identity>> {
        Ok(self.tokens.get(bearer_token).cloned())
    }
}
