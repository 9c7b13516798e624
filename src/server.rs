// Server setup and configuration

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::IssuerConfig;
use crate::endpoints::{AppState, auth_handler, jwks_handler, method_not_allowed};

/// Create the application router with all endpoints
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/.well-known/jwks.json",
            get(jwks_handler).fallback(method_not_allowed),
        )
        .route("/auth", post(auth_handler).fallback(method_not_allowed))
        .with_state(app_state)
}

pub async fn start_server(addr: SocketAddr, config: IssuerConfig) -> anyhow::Result<()> {
    let app_state = AppState::new(config);
    let app = create_app(app_state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("JWKS issuer listening on http://{}", addr);
    tracing::info!("  GET  /.well-known/jwks.json - JWKS endpoint");
    tracing::info!("  POST /auth                   - Token endpoint");
    tracing::info!("  POST /auth?expired           - Token signed with an expired key");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("JWKS issuer stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
