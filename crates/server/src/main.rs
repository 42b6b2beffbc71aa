//! finboard server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use finboard_api::{AppState, GateMode, router as api_router};
use finboard_common::Config;
use finboard_core::{PushSender, WebPushSender};
use finboard_queue::{SchedulerConfig, run_scheduler};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finboard=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting finboard server...");

    let config = Config::load()?;

    let db = Arc::new(finboard_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    finboard_db::migrate(&db).await?;
    info!("Migrations completed");

    let push_sender: Option<Arc<dyn PushSender>> = match &config.push {
        Some(push) => Some(Arc::new(WebPushSender::new(push)?)),
        None => {
            warn!("Push is not configured, cash-flow reminders are disabled");
            None
        }
    };

    let state = AppState::new(&db, &config, push_sender);

    let scheduler = if config.scheduler.enabled {
        info!("Starting in-process scheduler...");
        run_scheduler(
            &SchedulerConfig::from(&config.scheduler),
            Arc::new(state.sweeper_service.clone()),
        )
    } else {
        Vec::new()
    };

    let cache_cleanup = (state.gate_mode == GateMode::Live).then(|| {
        let every = Duration::from_secs(config.auth.suspension_cache_ttl_secs.max(1));
        state.suspension_cache.spawn_cleanup(every)
    });

    let app = Router::new()
        .nest("/api", api_router(&state))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            finboard_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for handle in scheduler.into_iter().chain(cache_cleanup) {
        handle.abort();
    }

    info!("Server shutdown complete");
    Ok(())
}
