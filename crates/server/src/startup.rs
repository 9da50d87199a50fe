use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, ServerConfig};
use service::{
    pagination::ListLimits,
    users::{FileUserStore, UserService},
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Open the store, wire the service and build the router.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let path = &cfg.storage.users_path;
    let store = Arc::new(FileUserStore::open(path).await?);
    let limits = ListLimits {
        default_page_size: cfg.pagination.default_page_size,
        max_page_size: cfg.pagination.max_page_size,
    };
    let users = Arc::new(UserService::new(store, limits));
    if cfg.storage.seed_on_empty && users.seed_if_empty().await? {
        info!(path = %path.display(), "seeded empty user store");
    }
    info!(path = %path.display(), ?limits, "user store ready");

    Ok(routes::build_router(ServerState { users }, build_cors()))
}

/// Build the app and serve it until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting user directory server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => {
            // no signal handler means no shutdown request; keep serving
            tracing::warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
