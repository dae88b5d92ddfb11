use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// キーごとの試行ウィンドウ。プロセスメモリ上にのみ存在し、再起動でリセットされる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptWindow {
    pub count: i64,
    pub reset_at: DateTime<Utc>,
}

impl AttemptWindow {
    /// `now` から `window` の長さを持つ空のウィンドウを生成する。
    pub fn fresh(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now + window,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_at
    }
}

/// レート制限チェックの結果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDecision {
    pub allowed: bool,
    pub remaining: i64,
    pub reset_at: DateTime<Utc>,
}

impl WindowDecision {
    /// ウィンドウがリセットされるまでの秒数（切り上げ）。リセット済みなら 0。
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds();
        if millis <= 0 {
            return 0;
        }
        u64::try_from((millis + 999) / 1000).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_fresh_window_starts_at_zero() {
        let window = AttemptWindow::fresh(at(0), Duration::seconds(60));
        assert_eq!(window.count, 0);
        assert_eq!(window.reset_at, at(60));
        assert!(!window.is_expired(at(59)));
        assert!(window.is_expired(at(60)));
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let decision = WindowDecision {
            allowed: false,
            remaining: 0,
            reset_at: at(60),
        };
        assert_eq!(decision.retry_after_secs(at(0)), 60);
        assert_eq!(
            decision.retry_after_secs(at(59) + Duration::milliseconds(1)),
            1
        );
        assert_eq!(decision.retry_after_secs(at(61)), 0);
    }
}
