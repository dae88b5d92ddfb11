pub mod admin_handler;
pub mod dev_handler;
pub mod entitlement_handler;
pub mod gift_handler;
pub mod health;
pub mod tier_handler;

use std::sync::Arc;

use axum::routing::{get, patch, post, put};
use axum::{middleware, Json, Router};
use dreamgate_ratelimit::{Clock, RateLimiter};
use utoipa::OpenApi;

use crate::adapter::middleware::{
    require_role, resolve_client_ip, resolve_identity, throttle, ThrottlePolicy, TrustedProxies,
};
use crate::adapter::repository::InMemoryStore;
use crate::domain::entity::Role;
use crate::domain::repository::{
    FlagRepository, GiftCodeRepository, SubscriptionRepository, UsageRepository,
};
use crate::domain::service::DevAccessGate;
use crate::infrastructure::IdentityProvider;
use crate::usecase::{
    CheckEntitlementUseCase, CreateGiftCodeUseCase, ListFlagsUseCase, RedeemGiftCodeUseCase,
    SetUserTierUseCase, UpdateFlagUseCase,
};

/// ユースケースが参照するリポジトリ群。
#[derive(Clone)]
pub struct Repositories {
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub usage: Arc<dyn UsageRepository>,
    pub gift_codes: Arc<dyn GiftCodeRepository>,
    pub flags: Arc<dyn FlagRepository>,
}

impl Repositories {
    /// 全リポジトリを 1 つのインメモリストアで賄う。
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            subscriptions: store.clone(),
            usage: store.clone(),
            gift_codes: store.clone(),
            flags: store,
        }
    }
}

/// AppState はアプリケーション全体の共有状態を表す。
#[derive(Clone)]
pub struct AppState {
    pub check_entitlement_uc: Arc<CheckEntitlementUseCase>,
    pub redeem_gift_uc: Arc<RedeemGiftCodeUseCase>,
    pub create_gift_uc: Arc<CreateGiftCodeUseCase>,
    pub set_user_tier_uc: Arc<SetUserTierUseCase>,
    pub list_flags_uc: Arc<ListFlagsUseCase>,
    pub update_flag_uc: Arc<UpdateFlagUseCase>,
    pub dev_gate: Arc<DevAccessGate>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub clock: Arc<dyn Clock>,
    pub gift_redeem_throttle: ThrottlePolicy,
    pub dev_routes_enabled: bool,
    pub trusted_proxies: TrustedProxies,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        dev_gate: Arc<DevAccessGate>,
        identity_provider: Arc<dyn IdentityProvider>,
        rate_limiter: Arc<dyn RateLimiter>,
        clock: Arc<dyn Clock>,
        gift_redeem_throttle: ThrottlePolicy,
        dev_routes_enabled: bool,
    ) -> Self {
        Self {
            check_entitlement_uc: Arc::new(CheckEntitlementUseCase::new(
                repos.subscriptions.clone(),
                repos.usage,
            )),
            redeem_gift_uc: Arc::new(RedeemGiftCodeUseCase::new(repos.gift_codes.clone())),
            create_gift_uc: Arc::new(CreateGiftCodeUseCase::new(repos.gift_codes)),
            set_user_tier_uc: Arc::new(SetUserTierUseCase::new(repos.subscriptions)),
            list_flags_uc: Arc::new(ListFlagsUseCase::new(repos.flags.clone())),
            update_flag_uc: Arc::new(UpdateFlagUseCase::new(repos.flags)),
            dev_gate,
            identity_provider,
            rate_limiter,
            clock,
            gift_redeem_throttle,
            dev_routes_enabled,
            trusted_proxies: TrustedProxies::default(),
        }
    }

    /// 転送ヘッダーを信頼するプロキシを設定する。既定は空 (接続元アドレスのみ)。
    pub fn with_trusted_proxies(mut self, trusted_proxies: TrustedProxies) -> Self {
        self.trusted_proxies = trusted_proxies;
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        tier_handler::list_tiers,
        entitlement_handler::get_dream_entitlement,
        gift_handler::redeem_gift_code,
        admin_handler::create_gift_code,
        admin_handler::set_user_tier,
        admin_handler::list_flags,
        admin_handler::update_flag,
        dev_handler::dev_status,
        dev_handler::dev_unlock,
    ),
    components(schemas(
        tier_handler::TierResponse,
        tier_handler::TierLimitsResponse,
        entitlement_handler::EntitlementResponse,
        gift_handler::RedeemGiftRequest,
        gift_handler::RedeemGiftResponse,
        admin_handler::CreateGiftCodeRequest,
        admin_handler::GiftCodeResponse,
        admin_handler::SetUserTierRequest,
        admin_handler::SubscriptionResponse,
        admin_handler::FlagResponse,
        admin_handler::UpdateFlagRequest,
        dev_handler::DevStatusResponse,
        dev_handler::DevUnlockRequest,
        ErrorResponse,
        ErrorBody,
    )),
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the REST API router.
pub fn router(state: AppState) -> Router {
    // User endpoints: role "user" 以上
    let entitlement_routes = Router::new()
        .route(
            "/api/v1/entitlements/dreams",
            get(entitlement_handler::get_dream_entitlement),
        )
        .route_layer(middleware::from_fn(require_role(Role::User)));

    // Gift redemption: 認可の後にクライアント単位のスロットル
    let gift_routes = Router::new()
        .route("/api/v1/gifts/redeem", post(gift_handler::redeem_gift_code))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            throttle("gift", state.gift_redeem_throttle),
        ))
        .route_layer(middleware::from_fn(require_role(Role::User)));

    // Admin endpoints: role "admin"
    let admin_routes = Router::new()
        .route("/api/v1/admin/gifts", post(admin_handler::create_gift_code))
        .route(
            "/api/v1/admin/users/{id}/tier",
            put(admin_handler::set_user_tier),
        )
        .route("/api/v1/admin/flags", get(admin_handler::list_flags))
        .route("/api/v1/admin/flags/{id}", patch(admin_handler::update_flag))
        .route_layer(middleware::from_fn(require_role(Role::Admin)));

    // Protected routes share resolve_identity for Bearer token resolution
    let protected = Router::new()
        .merge(entitlement_routes)
        .merge(gift_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ));

    let mut public = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api/v1/tiers", get(tier_handler::list_tiers))
        .route("/api-docs/openapi.json", get(openapi_json));

    // 無効化時は開発者ルート自体を登録しない（404 になる）
    if state.dev_routes_enabled {
        public = public
            .route("/api/v1/dev/status", get(dev_handler::dev_status))
            .route("/api/v1/dev/unlock", post(dev_handler::dev_unlock));
    }

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_client_ip,
        ))
        .with_state(state)
}

/// ErrorResponse は統一エラーレスポンス。
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        }
    }
}
