//! 固定ウィンドウ方式のレート制限と、テスト可能な時刻ソースを提供する。
//!
//! サーバーは [`RateLimiter`] トレイト越しにカウンターを参照する。
//! 単一プロセス構成では [`InMemoryWindowedCounter`] を使い、
//! 水平スケール時は原子的インクリメントを持つ共有ストアの実装に差し替える。

pub mod clock;
pub mod error;
pub mod in_memory;
pub mod limiter;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RateLimitError;
pub use in_memory::InMemoryWindowedCounter;
pub use limiter::RateLimiter;
pub use types::{AttemptWindow, WindowDecision};

#[cfg(test)]
pub use limiter::MockRateLimiter;
