//! 開発者モードのステルス解除ゲート。
//!
//! 状態は呼び出し元ごとに `LOCKED -> UNLOCKED` のみで、UNLOCKED は Cookie の失効により
//! 暗黙的に LOCKED へ戻る。シークレット未設定のデプロイでは常に解除を拒否する。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dreamgate_ratelimit::{RateLimitError, RateLimiter};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::session_signer::SessionSigner;

pub const DEV_SESSION_COOKIE: &str = "dev_session";

/// DevAccessGate の設定。
pub struct DevAccessSettings {
    pub secret: Option<SecretString>,
    pub attempt_limit: i64,
    pub attempt_window: Duration,
    pub session_ttl: Duration,
    pub secure_cookie: bool,
}

/// 解除成功時にクライアントへ設定する Cookie。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevSessionCookie {
    pub value: String,
    pub max_age_secs: i64,
    pub secure: bool,
}

impl DevSessionCookie {
    /// `Set-Cookie` ヘッダー値。HttpOnly と SameSite=Strict は常に付与する。
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
            DEV_SESSION_COOKIE, self.value, self.max_age_secs
        );
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked(DevSessionCookie),
    Denied,
    TooManyAttempts { retry_after_secs: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum DevAccessError {
    #[error("rate limiter error: {0}")]
    RateLimit(#[from] RateLimitError),
}

pub struct DevAccessGate {
    limiter: Arc<dyn RateLimiter>,
    secret: Option<SecretString>,
    signer: Option<SessionSigner>,
    attempt_limit: i64,
    attempt_window: Duration,
    session_ttl: Duration,
    secure_cookie: bool,
}

impl DevAccessGate {
    pub fn new(limiter: Arc<dyn RateLimiter>, settings: DevAccessSettings) -> Self {
        // 空文字のシークレットは未設定と同じ扱い（「任意の値が一致する」にはしない）
        let secret = settings
            .secret
            .filter(|s| !s.expose_secret().trim().is_empty());
        let signer = secret.as_ref().map(SessionSigner::new);
        Self {
            limiter,
            secret,
            signer,
            attempt_limit: settings.attempt_limit,
            attempt_window: settings.attempt_window,
            session_ttl: settings.session_ttl,
            secure_cookie: settings.secure_cookie,
        }
    }

    /// 解除可能な状態か（シークレットが設定されているか）。
    pub fn is_armed(&self) -> bool {
        self.secret.is_some()
    }

    /// 提示された Cookie 値が有効な解除済みセッションかを返す。副作用なし。
    pub fn status(&self, cookie: Option<&str>, now: DateTime<Utc>) -> bool {
        match (&self.signer, cookie) {
            (Some(signer), Some(value)) => signer.verify(value, now),
            _ => false,
        }
    }

    /// 解除を試みる。試行回数の制限はシークレット比較より前に評価する。
    pub async fn attempt_unlock(
        &self,
        provided: &str,
        now: DateTime<Utc>,
        attempt_key: &str,
    ) -> Result<UnlockOutcome, DevAccessError> {
        let decision = self
            .limiter
            .check(attempt_key, self.attempt_limit, self.attempt_window, now)
            .await?;
        if !decision.allowed {
            warn!(attempt_key = %attempt_key, "dev unlock throttled");
            return Ok(UnlockOutcome::TooManyAttempts {
                retry_after_secs: decision.retry_after_secs(now),
            });
        }

        let (Some(secret), Some(signer)) = (&self.secret, &self.signer) else {
            warn!(attempt_key = %attempt_key, "dev unlock attempted but no secret is configured");
            return Ok(UnlockOutcome::Denied);
        };

        if !secrets_match(provided, secret.expose_secret()) {
            info!(attempt_key = %attempt_key, remaining = decision.remaining, "dev unlock denied");
            return Ok(UnlockOutcome::Denied);
        }

        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        info!(attempt_key = %attempt_key, expires_at = %expires_at, "dev mode unlocked");
        Ok(UnlockOutcome::Unlocked(DevSessionCookie {
            value: signer.sign(expires_at),
            max_age_secs: self.session_ttl.num_seconds(),
            secure: self.secure_cookie,
        }))
    }
}

/// SHA-256 ダイジェスト同士を定数時間で比較し、長さの違いも漏らさない。
fn secrets_match(provided: &str, configured: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let configured = Sha256::digest(configured.as_bytes());
    provided.as_slice().ct_eq(configured.as_slice()).into()
}
