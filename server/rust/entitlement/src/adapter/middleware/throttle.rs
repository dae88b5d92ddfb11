use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Duration;
use tracing::{error, warn};

use super::client_ip::ClientIp;
use crate::adapter::handler::{AppState, ErrorResponse};

/// 1 ウィンドウあたりの許容リクエスト数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub limit: i64,
    pub window: Duration,
}

/// throttle はクライアント IP 単位の固定ウィンドウ制限ミドルウェアファクトリ。
/// キーは `"<purpose>:<client_ip>"` で、用途ごとにカウンターを分ける。
pub fn throttle(
    purpose: &'static str,
    policy: ThrottlePolicy,
) -> impl Fn(
    State<AppState>,
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone {
    move |State(state): State<AppState>, req: Request, next: Next| {
        Box::pin(throttle_check(state, req, next, purpose, policy))
    }
}

async fn throttle_check(
    state: AppState,
    req: Request,
    next: Next,
    purpose: &'static str,
    policy: ThrottlePolicy,
) -> Response {
    let ip = req
        .extensions()
        .get::<ClientIp>()
        .map_or_else(|| "unknown".to_string(), |ClientIp(ip)| ip.clone());
    let key = format!("{}:{}", purpose, ip);
    let now = state.clock.now();

    match state
        .rate_limiter
        .check(&key, policy.limit, policy.window, now)
        .await
    {
        Ok(decision) if decision.allowed => next.run(req).await,
        Ok(decision) => {
            let retry_after = decision.retry_after_secs(now);
            warn!(key = %key, retry_after, "request throttled");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.to_string())],
                Json(ErrorResponse::new(
                    "DREAM_RATE_LIMITED",
                    "Too many requests. Please retry later.",
                )),
            )
                .into_response()
        }
        // 設定不備時は許可しない
        Err(e) => {
            error!(key = %key, error = %e, "throttle check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("DREAM_INTERNAL_ERROR", "throttle unavailable")),
            )
                .into_response()
        }
    }
}
