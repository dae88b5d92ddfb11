use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{AppState, ErrorResponse};
use crate::adapter::middleware::ClientIp;
use crate::domain::service::dev_access_gate::DEV_SESSION_COOKIE;
use crate::domain::service::UnlockOutcome;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DevStatusResponse {
    pub unlocked: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DevUnlockRequest {
    pub secret: String,
}

/// Cookie ヘッダー（複数可）から `dev_session` の値を取り出す。
fn dev_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == DEV_SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// 拒否・試行回数超過・内部エラーはすべて同じ 403 を返す。
fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse::new("DREAM_FORBIDDEN", "Forbidden")),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/v1/dev/status",
    responses(
        (status = 200, description = "Whether the caller holds a valid dev session", body = DevStatusResponse),
    )
)]
pub async fn dev_status(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let cookie = dev_session_cookie(&headers);
    let unlocked = state.dev_gate.status(cookie.as_deref(), state.clock.now());
    Json(DevStatusResponse { unlocked })
}

#[utoipa::path(
    post,
    path = "/api/v1/dev/unlock",
    request_body = DevUnlockRequest,
    responses(
        (status = 200, description = "Unlocked; dev_session cookie is set", body = DevStatusResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
    )
)]
pub async fn dev_unlock(
    State(state): State<AppState>,
    Extension(ClientIp(ip)): Extension<ClientIp>,
    Json(req): Json<DevUnlockRequest>,
) -> impl IntoResponse {
    let attempt_key = format!("devunlock:{}", ip);
    let now = state.clock.now();
    match state
        .dev_gate
        .attempt_unlock(&req.secret, now, &attempt_key)
        .await
    {
        Ok(UnlockOutcome::Unlocked(cookie)) => (
            StatusCode::OK,
            [(header::SET_COOKIE, cookie.to_header_value())],
            Json(DevStatusResponse { unlocked: true }),
        )
            .into_response(),
        Ok(UnlockOutcome::Denied | UnlockOutcome::TooManyAttempts { .. }) => forbidden(),
        Err(e) => {
            error!(attempt_key = %attempt_key, error = %e, "dev unlock failed");
            forbidden()
        }
    }
}
