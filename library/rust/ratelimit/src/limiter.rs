use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::RateLimitError;
use crate::types::WindowDecision;

/// 固定ウィンドウ方式のレートリミッター。
///
/// 同一キーに対する読み取り・更新・書き込みは実装側で臨界区間として扱うこと。
/// ウィンドウ境界をまたぐと最大 `2 * limit` 件のバーストを許容する点に注意。
/// 厳密な平滑化が必要な呼び出し元はトークンバケットで包むこと。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// `key` の試行を 1 件記録し、許可可否を返す。
    ///
    /// `limit <= 0` は常に拒否する。`window <= 0` は [`RateLimitError::InvalidWindow`]。
    async fn check(
        &self,
        key: &str,
        limit: i64,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<WindowDecision, RateLimitError>;
}
