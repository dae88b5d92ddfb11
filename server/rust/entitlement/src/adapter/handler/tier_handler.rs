use axum::Json;
use serde::Serialize;

use crate::domain::entity::{Tier, TierLimits};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TierLimitsResponse {
    /// -1 は無制限。
    pub dreams_per_month: i64,
    pub panels_per_dream: i64,
    pub max_storage_mb: i64,
}

impl From<&TierLimits> for TierLimitsResponse {
    fn from(limits: &TierLimits) -> Self {
        Self {
            dreams_per_month: limits.dreams_per_month,
            panels_per_dream: limits.panels_per_dream,
            max_storage_mb: limits.max_storage_mb,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TierResponse {
    pub name: String,
    pub monthly_price_cents: u32,
    pub limits: TierLimitsResponse,
    pub features: Vec<String>,
}

impl From<&Tier> for TierResponse {
    fn from(tier: &Tier) -> Self {
        Self {
            name: tier.name.to_string(),
            monthly_price_cents: tier.monthly_price_cents,
            limits: TierLimitsResponse::from(&tier.limits),
            features: tier.features.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/tiers",
    responses(
        (status = 200, description = "Tier catalog in display order", body = Vec<TierResponse>),
    )
)]
pub async fn list_tiers() -> Json<Vec<TierResponse>> {
    Json(Tier::catalog().iter().map(TierResponse::from).collect())
}
