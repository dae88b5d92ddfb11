use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::error::RateLimitError;
use crate::limiter::RateLimiter;
use crate::types::{AttemptWindow, WindowDecision};

/// プロセス内メモリで試行ウィンドウを管理する固定ウィンドウカウンター。
/// 状態は永続化されず、プロセス再起動で全てのスロットリングがリセットされる。
pub struct InMemoryWindowedCounter {
    windows: Mutex<HashMap<String, AttemptWindow>>,
}

impl InMemoryWindowedCounter {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// `now` 時点で期限切れのウィンドウを削除し、削除件数を返す。
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| !w.is_expired(now));
        let purged = before - windows.len();
        if purged > 0 {
            tracing::debug!(purged, remaining = windows.len(), "expired attempt windows purged");
        }
        purged
    }

    /// 保持しているウィンドウ数。テスト用ヘルパー。
    #[cfg(test)]
    pub async fn window_count(&self) -> usize {
        self.windows.lock().await.len()
    }

    /// キーの現在のウィンドウを返す。テスト用ヘルパー。
    #[cfg(test)]
    pub async fn window(&self, key: &str) -> Option<AttemptWindow> {
        self.windows.lock().await.get(key).cloned()
    }
}

impl Default for InMemoryWindowedCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimiter for InMemoryWindowedCounter {
    async fn check(
        &self,
        key: &str,
        limit: i64,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<WindowDecision, RateLimitError> {
        if window <= Duration::zero() {
            return Err(RateLimitError::InvalidWindow {
                key: key.to_string(),
                window_ms: window.num_milliseconds(),
            });
        }

        // 読み取りから書き込みまでロックを保持し、同一キーの更新を直列化する
        let mut windows = self.windows.lock().await;
        let entry = windows
            .entry(key.to_string())
            .or_insert_with(|| AttemptWindow::fresh(now, window));
        if entry.is_expired(now) {
            *entry = AttemptWindow::fresh(now, window);
        }
        entry.count = entry.count.saturating_add(1);

        let allowed = limit > 0 && entry.count <= limit;
        Ok(WindowDecision {
            allowed,
            remaining: limit.saturating_sub(entry.count).max(0),
            reset_at: entry.reset_at,
        })
    }
}
