pub mod auth;
pub mod client_ip;
pub mod rbac;
pub mod throttle;

pub use auth::{extract_bearer_token, resolve_identity};
pub use client_ip::{resolve_client_ip, ClientIp, TrustedProxies};
pub use rbac::require_role;
pub use throttle::{throttle, ThrottlePolicy};
