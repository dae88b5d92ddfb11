use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AppState, ErrorResponse};
use crate::domain::entity::Identity;
use crate::usecase::redeem_gift_code::RedeemGiftCodeError;

/// POST /api/v1/gifts/redeem のリクエストボディ。
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RedeemGiftRequest {
    pub code: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RedeemGiftResponse {
    pub tier: String,
    pub duration_months: u32,
    /// 適用後のサブスクリプションのティア。上位ティアが有効中ならそちらが維持される。
    pub subscription_tier: String,
    /// 無期限の場合は null。
    pub expires_at: Option<DateTime<Utc>>,
}

#[utoipa::path(
    post,
    path = "/api/v1/gifts/redeem",
    request_body = RedeemGiftRequest,
    responses(
        (status = 200, description = "Gift code applied", body = RedeemGiftResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Gift code not found", body = ErrorResponse),
        (status = 409, description = "Gift code already redeemed", body = ErrorResponse),
        (status = 410, description = "Gift code expired", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse),
    )
)]
pub async fn redeem_gift_code(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<RedeemGiftRequest>,
) -> impl IntoResponse {
    let now = state.clock.now();
    match state
        .redeem_gift_uc
        .execute(&req.code, &identity.id, now)
        .await
    {
        Ok(redemption) => (
            StatusCode::OK,
            Json(RedeemGiftResponse {
                tier: redemption.tier.to_string(),
                duration_months: redemption.duration_months,
                subscription_tier: redemption.subscription_tier.to_string(),
                expires_at: redemption.subscription_expires_at,
            }),
        )
            .into_response(),
        Err(e) => {
            let (status, code) = match &e {
                RedeemGiftCodeError::NotFound => (StatusCode::NOT_FOUND, "DREAM_GIFT_NOT_FOUND"),
                RedeemGiftCodeError::AlreadyRedeemed => {
                    (StatusCode::CONFLICT, "DREAM_GIFT_ALREADY_REDEEMED")
                }
                RedeemGiftCodeError::Expired => (StatusCode::GONE, "DREAM_GIFT_EXPIRED"),
                RedeemGiftCodeError::Internal(msg) => {
                    tracing::error!(error = %msg, "gift redemption failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "DREAM_INTERNAL_ERROR")
                }
            };
            (status, Json(ErrorResponse::new(code, &e.to_string()))).into_response()
        }
    }
}
