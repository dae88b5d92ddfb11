use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dreamgate_ratelimit::{Clock, InMemoryWindowedCounter, RateLimiter, SystemClock};
use tower_http::trace::TraceLayer;
use tracing::info;

use dreamgate_entitlement_server::adapter::handler::{self, AppState, Repositories};
use dreamgate_entitlement_server::adapter::middleware::{ThrottlePolicy, TrustedProxies};
use dreamgate_entitlement_server::adapter::repository::InMemoryStore;
use dreamgate_entitlement_server::domain::service::DevAccessGate;
use dreamgate_entitlement_server::infrastructure::config::Config;
use dreamgate_entitlement_server::infrastructure::{IdentityProvider, StaticTokenIdentityProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    // Config
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/config.yaml".to_string());
    let mut cfg = Config::load(&config_path)?;
    cfg.apply_env_overrides();
    cfg.validate()?;

    info!(
        app_name = %cfg.app.name,
        version = %cfg.app.version,
        environment = %cfg.app.environment,
        dev_routes = cfg.dev_access.enabled,
        "starting entitlement server"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Attempt counters (プロセス内。水平スケール時は共有ストア実装に差し替える)
    let counter = Arc::new(InMemoryWindowedCounter::new());
    let rate_limiter: Arc<dyn RateLimiter> = counter.clone();

    // Repositories
    let store = Arc::new(InMemoryStore::new());
    info!("no database configured, using in-memory repositories");

    let identity_provider: Arc<dyn IdentityProvider> =
        Arc::new(StaticTokenIdentityProvider::from_config(&cfg.identity));

    let gift_redeem_throttle = ThrottlePolicy {
        limit: cfg.throttle.gift_redeem_limit,
        window: cfg.throttle.gift_redeem_window(),
    };
    let purge_interval = Duration::from_secs(cfg.throttle.purge_interval_secs);
    let dev_routes_enabled = cfg.dev_access.enabled;
    let secure_cookie = cfg.is_production();
    let dev_gate = Arc::new(DevAccessGate::new(
        rate_limiter.clone(),
        cfg.dev_access.into_settings(secure_cookie),
    ));
    info!(
        enabled = dev_routes_enabled,
        armed = dev_gate.is_armed(),
        "dev access gate configured"
    );

    // 期限切れウィンドウの定期削除
    {
        let counter = counter.clone();
        let clock = clock.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(purge_interval);
            loop {
                ticker.tick().await;
                counter.purge_expired(clock.now()).await;
            }
        });
    }

    let state = AppState::new(
        Repositories::in_memory(store),
        dev_gate,
        identity_provider,
        rate_limiter,
        clock,
        gift_redeem_throttle,
        dev_routes_enabled,
    )
    .with_trusted_proxies(TrustedProxies::new(cfg.server.trusted_proxies.iter().copied()));

    // Router
    let app = handler::router(state).layer(TraceLayer::new_for_http());

    // REST server
    let rest_addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!("REST server starting on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("entitlement server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    info!("shutdown signal received");
}
