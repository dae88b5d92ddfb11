use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Serialize;

use super::{AppState, ErrorResponse};
use crate::domain::entity::Identity;
use crate::usecase::check_entitlement::{CheckEntitlementError, EntitlementSummary};

/// GET /api/v1/entitlements/dreams のレスポンスボディ。
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EntitlementResponse {
    pub tier: String,
    pub period: String,
    pub used: u64,
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub unlimited: bool,
    pub allowed: bool,
}

impl From<EntitlementSummary> for EntitlementResponse {
    fn from(summary: EntitlementSummary) -> Self {
        Self {
            tier: summary.tier.to_string(),
            period: summary.period,
            used: summary.used,
            limit: summary.limit,
            remaining: summary.remaining,
            unlimited: summary.unlimited,
            allowed: summary.allowed,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/entitlements/dreams",
    responses(
        (status = 200, description = "Dream quota for the current period", body = EntitlementResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
    )
)]
pub async fn get_dream_entitlement(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> impl IntoResponse {
    let now = state.clock.now();
    match state.check_entitlement_uc.execute(&identity, now).await {
        Ok(summary) => (StatusCode::OK, Json(EntitlementResponse::from(summary))).into_response(),
        Err(CheckEntitlementError::Internal(msg)) => {
            tracing::error!(user_id = %identity.id, error = %msg, "entitlement check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("DREAM_INTERNAL_ERROR", &msg)),
            )
                .into_response()
        }
    }
}
