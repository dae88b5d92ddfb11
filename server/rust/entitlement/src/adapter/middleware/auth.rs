use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::adapter::handler::{AppState, ErrorResponse};

/// Authorization ヘッダーから Bearer トークンを取り出す。
/// ヘッダーがない・形式が違う・値が空の場合は None。
pub fn extract_bearer_token<B>(req: &axum::http::Request<B>) -> Option<String> {
    let auth_header = req.headers().get(axum::http::header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// resolve_identity は Bearer トークンを IdentityProvider で解決し、
/// Request extension に Identity を格納する axum ミドルウェア。
///
/// トークンがない場合は Identity なしで後続に渡す（401 を返すかは rbac 側が決める）。
/// トークンが提示されたのに解決できない場合は 401 を返す。
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(&req) else {
        return next.run(req).await;
    };

    match state.identity_provider.resolve(&token).await {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "DREAM_AUTH_TOKEN_INVALID",
                "Token validation failed",
            )),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "identity provider failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "DREAM_INTERNAL_ERROR",
                    "identity provider unavailable",
                )),
            )
                .into_response()
        }
    }
}
