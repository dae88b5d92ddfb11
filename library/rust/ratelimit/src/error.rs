use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateLimitError {
    /// ウィンドウ長が 0 以下。設定誤りとして扱い、許可にはフォールバックしない。
    #[error("ウィンドウ長が不正です: key={key}, window_ms={window_ms}")]
    InvalidWindow { key: String, window_ms: i64 },
    #[error("レート制限ストアエラー: {0}")]
    Store(String),
}
