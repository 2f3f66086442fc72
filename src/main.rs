use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use sso_auth::{
    config::AppConfig,
    db::{connection, dao::DaoContext},
    logging::init_tracing,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    services::{
        maintenance::spawn_purge_task,
        notifier::{NotificationDispatcher, notifier_from_config},
    },
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        eprintln!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging.rust_log);
    if cfg.auth.uses_dev_secrets() {
        tracing::warn!("running with built-in development token secrets");
    }

    let db = match &cfg.database {
        Some(db_cfg) => connection::connect(db_cfg).await?,
        None => {
            tracing::warn!("no database configured; using a throwaway in-memory SQLite database");
            connection::connect_in_memory().await?
        }
    };

    let (notifier, _workers) =
        NotificationDispatcher::spawn(notifier_from_config(&cfg.notifier)?, &cfg.notifier);
    let purge_every = Duration::from_secs(cfg.auth.purge_interval_secs);
    let state = AppState::new(cfg, db, notifier);
    spawn_purge_task(DaoContext::new(&state.db), purge_every);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .context("invalid host/port")?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
