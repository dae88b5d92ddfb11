use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapter::handler::ErrorResponse;
use crate::domain::entity::{Identity, Role};
use crate::domain::service::{AuthorizationOutcome, AuthorizationService};

/// require_role はロールベースのアクセス制御ミドルウェアファクトリ。
/// resolve_identity の後に使用すること。
///
/// - Identity がない: 401
/// - ロール不足: 403
pub fn require_role(
    required: Role,
) -> impl Fn(Request<Body>, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone {
    move |req: Request<Body>, next: Next| Box::pin(rbac_check(req, next, required))
}

async fn rbac_check(req: Request<Body>, next: Next, required: Role) -> Response {
    let identity = req.extensions().get::<Identity>();
    match AuthorizationService::require_role(identity, required) {
        AuthorizationOutcome::Allowed => next.run(req).await,
        AuthorizationOutcome::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "DREAM_AUTH_MISSING_TOKEN",
                "Authentication is required. Please provide a valid Bearer token.",
            )),
        )
            .into_response(),
        AuthorizationOutcome::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "DREAM_AUTH_PERMISSION_DENIED",
                &format!("Insufficient permissions: role '{}' is required.", required.as_str()),
            )),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(required: Role) -> Router {
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(require_role(required)))
    }

    fn request(identity: Option<Identity>) -> Request<Body> {
        let mut req = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .unwrap();
        if let Some(identity) = identity {
            req.extensions_mut().insert(identity);
        }
        req
    }

    #[tokio::test]
    async fn test_missing_identity_is_401() {
        let resp = app(Role::User).oneshot(request(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_on_admin_route_is_403() {
        let resp = app(Role::Admin)
            .oneshot(request(Some(Identity::new("user-1", Role::User))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_passes_user_route() {
        let resp = app(Role::User)
            .oneshot(request(Some(Identity::new("admin-1", Role::Admin))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
