use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppState, ErrorResponse};
use crate::domain::entity::{
    ContentFlag, FlagFilter, FlagStatus, GiftCode, Identity, Subscription, Tier,
};
use crate::usecase::create_gift_code::{CreateGiftCodeError, CreateGiftCodeInput};
use crate::usecase::list_flags::ListFlagsError;
use crate::usecase::set_user_tier::{SetUserTierError, SetUserTierInput};
use crate::usecase::update_flag::UpdateFlagError;

fn validation_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("DREAM_VALIDATION_ERROR", message)),
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    tracing::error!(error = %message, "admin operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("DREAM_INTERNAL_ERROR", message)),
    )
        .into_response()
}

/// POST /api/v1/admin/gifts のリクエストボディ。
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateGiftCodeRequest {
    pub tier: String,
    pub duration_months: u32,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GiftCodeResponse {
    pub code: String,
    pub tier: String,
    pub duration_months: u32,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<GiftCode> for GiftCodeResponse {
    fn from(gift: GiftCode) -> Self {
        Self {
            code: gift.code,
            tier: gift.tier.to_string(),
            duration_months: gift.duration_months,
            expires_at: gift.expires_at,
            created_by: gift.created_by,
            created_at: gift.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/gifts",
    request_body = CreateGiftCodeRequest,
    responses(
        (status = 201, description = "Gift code created", body = GiftCodeResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
    )
)]
pub async fn create_gift_code(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateGiftCodeRequest>,
) -> impl IntoResponse {
    let tier = match Tier::lookup(&req.tier).map(|t| t.name) {
        Ok(tier) => tier,
        Err(e) => return validation_error(&e.to_string()),
    };
    let input = CreateGiftCodeInput {
        tier,
        duration_months: req.duration_months,
        expires_at: req.expires_at,
    };

    let now = state.clock.now();
    match state.create_gift_uc.execute(&input, &identity.id, now).await {
        Ok(gift) => (StatusCode::CREATED, Json(GiftCodeResponse::from(gift))).into_response(),
        Err(CreateGiftCodeError::Validation(msg)) => validation_error(&msg),
        Err(CreateGiftCodeError::Internal(msg)) => internal_error(&msg),
    }
}

/// PUT /api/v1/admin/users/{id}/tier のリクエストボディ。
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetUserTierRequest {
    pub tier: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubscriptionResponse {
    pub user_id: String,
    pub tier: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            user_id: sub.user_id,
            tier: sub.tier.to_string(),
            expires_at: sub.expires_at,
            updated_at: sub.updated_at,
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/tier",
    params(("id" = String, Path, description = "User ID")),
    request_body = SetUserTierRequest,
    responses(
        (status = 200, description = "Subscription updated", body = SubscriptionResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
    )
)]
pub async fn set_user_tier(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<String>,
    Json(req): Json<SetUserTierRequest>,
) -> impl IntoResponse {
    let tier = match Tier::lookup(&req.tier).map(|t| t.name) {
        Ok(tier) => tier,
        Err(e) => return validation_error(&e.to_string()),
    };
    let input = SetUserTierInput {
        tier,
        expires_at: req.expires_at,
    };

    let now = state.clock.now();
    match state
        .set_user_tier_uc
        .execute(&user_id, &input, &identity.id, now)
        .await
    {
        Ok(sub) => (StatusCode::OK, Json(SubscriptionResponse::from(sub))).into_response(),
        Err(SetUserTierError::Validation(msg)) => validation_error(&msg),
        Err(SetUserTierError::Internal(msg)) => internal_error(&msg),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListFlagsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FlagResponse {
    pub id: String,
    pub dream_id: String,
    pub reporter_id: String,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentFlag> for FlagResponse {
    fn from(flag: ContentFlag) -> Self {
        Self {
            id: flag.id.to_string(),
            dream_id: flag.dream_id,
            reporter_id: flag.reporter_id,
            reason: flag.reason,
            status: flag.status.as_str().to_string(),
            created_at: flag.created_at,
            updated_at: flag.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/flags",
    params(("status" = Option<String>, Query, description = "pending | reviewed | dismissed")),
    responses(
        (status = 200, description = "Content flags, oldest first", body = Vec<FlagResponse>),
        (status = 400, description = "Invalid status filter", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
    )
)]
pub async fn list_flags(
    State(state): State<AppState>,
    Query(query): Query<ListFlagsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref().map(str::parse::<FlagStatus>).transpose() {
        Ok(status) => status,
        Err(msg) => return validation_error(&msg),
    };

    match state.list_flags_uc.execute(&FlagFilter { status }).await {
        Ok(flags) => {
            let body: Vec<FlagResponse> = flags.into_iter().map(FlagResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(ListFlagsError::Internal(msg)) => internal_error(&msg),
    }
}

/// PATCH /api/v1/admin/flags/{id} のリクエストボディ。
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateFlagRequest {
    pub status: String,
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/flags/{id}",
    params(("id" = String, Path, description = "Flag ID (UUID)")),
    request_body = UpdateFlagRequest,
    responses(
        (status = 200, description = "Flag updated", body = FlagResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Flag not found", body = ErrorResponse),
    )
)]
pub async fn update_flag(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFlagRequest>,
) -> impl IntoResponse {
    let Ok(id) = Uuid::parse_str(&id) else {
        return validation_error("id must be a UUID");
    };
    let status = match req.status.parse::<FlagStatus>() {
        Ok(status) => status,
        Err(msg) => return validation_error(&msg),
    };

    let now = state.clock.now();
    match state
        .update_flag_uc
        .execute(&id, status, &identity.id, now)
        .await
    {
        Ok(flag) => (StatusCode::OK, Json(FlagResponse::from(flag))).into_response(),
        Err(e @ UpdateFlagError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("DREAM_FLAG_NOT_FOUND", &e.to_string())),
        )
            .into_response(),
        Err(UpdateFlagError::Internal(msg)) => internal_error(&msg),
    }
}
