//! REST API server.
//!
//! Routes live under `/api/v1`. The server shuts down gracefully on
//! Ctrl+C or SIGTERM.

pub mod error;
pub mod handlers;

pub use error::AppError;

use crate::alignment::AlignmentSettings;
use crate::store::{OfficialStore, PostgrestClient, VoteStore};
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Pass-through queries.
    pub db: PostgrestClient,
    pub votes: Arc<dyn VoteStore>,
    pub officials: Arc<dyn OfficialStore>,
    pub alignment: Arc<AlignmentSettings>,
}

impl AppState {
    /// State backed entirely by one database client.
    pub fn new(db: PostgrestClient, alignment: AlignmentSettings) -> Self {
        let shared = Arc::new(db.clone());
        Self {
            db,
            votes: shared.clone(),
            officials: shared,
            alignment: Arc::new(alignment),
        }
    }
}

pub fn router(state: AppState) -> Router {
    use handlers::*;

    let api = Router::new()
        .route("/health", get(health))
        .route("/officials", get(list_officials).post(create_official))
        .route(
            "/officials/:id",
            get(get_official)
                .put(update_official)
                .delete(delete_official),
        )
        .route("/officials/party/:party", get(officials_by_party))
        .route("/officials/ward/:ward", get(officials_by_ward))
        .route("/officials/:id/voting-records", get(voting_records))
        .route("/officials/:id/committees", get(official_committees))
        .route("/officials/:id/metrics", get(official_metrics))
        .route("/officials/:id/voting-allies", get(voting_allies))
        .route("/officials/:id/recent-votes", get(recent_votes))
        .route("/voting-records", post(create_voting_record))
        .route("/wards/:ward/statistics", get(ward_statistics))
        .route("/wards/:ward/metrics", get(ward_metrics))
        .route("/committees", get(list_committees));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until a shutdown signal arrives.
pub async fn start(state: AppState, host: &str, port: u16) -> Result<()> {
    let address = format!("{}:{}", host, port);
    info!("Binding to {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server running on {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
