use std::net::IpAddr;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::entity::Role;
use crate::domain::service::DevAccessSettings;

/// 起動時に検出される設定エラー。プロセス起動を中止する。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("dev_access is enabled but no secret is configured (set dev_access.secret or DEV_UNLOCK_SECRET)")]
    MissingDevSecret,

    #[error("invalid config value {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Application configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub dev_access: DevAccessConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        Ok(cfg)
    }

    /// 環境変数による上書きを適用する。
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup("DEV_UNLOCK_SECRET") {
            self.dev_access.secret = Some(SecretString::from(secret));
        }
        if let Some(disabled) = lookup("DISABLE_DEV_ROUTES") {
            if matches!(disabled.trim(), "1" | "true" | "TRUE" | "yes") {
                self.dev_access.enabled = false;
            }
        }
        if let Some(environment) = lookup("ENVIRONMENT") {
            self.app.environment = environment;
        }
    }

    /// 設定値を検証する。開発者ルート有効時のシークレット未設定は起動エラー。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dev = &self.dev_access;
        if dev.enabled {
            let has_secret = dev
                .secret
                .as_ref()
                .is_some_and(|s| !s.expose_secret().trim().is_empty());
            if !has_secret {
                return Err(ConfigError::MissingDevSecret);
            }
        }
        positive("dev_access.attempt_limit", dev.attempt_limit)?;
        bounded(
            "dev_access.attempt_window_secs",
            dev.attempt_window_secs,
            MAX_WINDOW_SECS,
        )?;
        bounded(
            "dev_access.session_ttl_days",
            dev.session_ttl_days,
            MAX_SESSION_TTL_DAYS,
        )?;
        positive("throttle.gift_redeem_limit", self.throttle.gift_redeem_limit)?;
        bounded(
            "throttle.gift_redeem_window_secs",
            self.throttle.gift_redeem_window_secs,
            MAX_WINDOW_SECS,
        )?;
        bounded(
            "throttle.purge_interval_secs",
            self.throttle.purge_interval_secs,
            MAX_WINDOW_SECS,
        )?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        matches!(self.app.environment.as_str(), "prod" | "production")
    }
}

fn positive(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be positive, got {}", value),
        });
    }
    Ok(())
}

/// ウィンドウ・間隔の上限 (1 日)。
const MAX_WINDOW_SECS: u64 = 86_400;

/// 開発者セッションの有効期間の上限。
const MAX_SESSION_TTL_DAYS: u64 = 365;

fn bounded(field: &'static str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be positive, got 0".to_string(),
        });
    }
    if value > max {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be at most {}, got {}", max, value),
        });
    }
    Ok(())
}

// validate() 済みの値は上限内。未検証の値も上限で丸めて chrono の範囲に収める。
fn secs(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value.min(MAX_WINDOW_SECS)).unwrap_or(1))
}

fn days(value: u64) -> Duration {
    Duration::days(i64::try_from(value.min(MAX_SESSION_TTL_DAYS)).unwrap_or(1))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 転送ヘッダーを信頼するリバースプロキシのアドレス。空なら接続元アドレスのみを使う。
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// DevAccessConfig は開発者モード解除ゲートの設定を表す。
/// `secret` は Debug 出力で [REDACTED] となり、ログに出力されない。
#[derive(Debug, Deserialize)]
pub struct DevAccessConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub secret: Option<SecretString>,
    #[serde(default = "default_attempt_limit")]
    pub attempt_limit: i64,
    #[serde(default = "default_attempt_window_secs")]
    pub attempt_window_secs: u64,
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: u64,
}

impl Default for DevAccessConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: None,
            attempt_limit: default_attempt_limit(),
            attempt_window_secs: default_attempt_window_secs(),
            session_ttl_days: default_session_ttl_days(),
        }
    }
}

impl DevAccessConfig {
    /// ゲート用の設定に変換する。シークレットの所有権はゲートへ移る。
    pub fn into_settings(self, secure_cookie: bool) -> DevAccessSettings {
        DevAccessSettings {
            secret: self.secret,
            attempt_limit: self.attempt_limit,
            attempt_window: secs(self.attempt_window_secs),
            session_ttl: days(self.session_ttl_days),
            secure_cookie,
        }
    }
}

fn default_attempt_limit() -> i64 {
    20
}

fn default_attempt_window_secs() -> u64 {
    60
}

fn default_session_ttl_days() -> u64 {
    7
}

/// ThrottleConfig は未認証エンドポイント向けのクライアント単位スロットル設定。
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "default_gift_redeem_limit")]
    pub gift_redeem_limit: i64,
    #[serde(default = "default_gift_redeem_window_secs")]
    pub gift_redeem_window_secs: u64,
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            gift_redeem_limit: default_gift_redeem_limit(),
            gift_redeem_window_secs: default_gift_redeem_window_secs(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl ThrottleConfig {
    pub fn gift_redeem_window(&self) -> Duration {
        secs(self.gift_redeem_window_secs)
    }
}

fn default_gift_redeem_limit() -> i64 {
    10
}

fn default_gift_redeem_window_secs() -> u64 {
    60
}

fn default_purge_interval_secs() -> u64 {
    300
}

/// 開発用の静的トークン → 呼び出し元の対応表。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub tokens: Vec<StaticTokenConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticTokenConfig {
    pub token: String,
    pub user_id: String,
    pub role: Role,
}
