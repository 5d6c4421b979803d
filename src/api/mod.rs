//! REST API server for Huddle.
//!
//! Provides HTTP endpoints for:
//! - Running meetings and reading transcripts
//! - The decision log
//! - Participants and meeting types
//! - Feature requests

pub mod error;
pub mod routes;

use crate::app::Orchestrator;
use crate::config::ServerConfig;
use anyhow::{Context, Result};
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

pub struct ApiServer {
    host: String,
    port: u16,
    orchestrator: Orchestrator,
}

impl ApiServer {
    pub fn new(orchestrator: Orchestrator, config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            orchestrator,
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.orchestrator);
        let address = format!("{}:{}", self.host, self.port);

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;

        info!("API server listening on http://{}", address);
        info!("Endpoints:");
        info!("  GET  /                      - Service info");
        info!("  GET  /version               - Version info");
        info!("  GET  /participants          - List participants");
        info!("  GET  /meeting-types         - List meeting types");
        info!("  POST /meetings              - Run a meeting");
        info!("  GET  /meetings              - List transcripts");
        info!("  GET  /meetings/status       - Current meeting phase");
        info!("  GET  /meetings/:id          - Get a transcript");
        info!("  GET  /decisions             - Query decisions");
        info!("  POST /decisions             - Record a decision");
        info!("  GET  /decisions/:id         - Get a decision");
        info!("  PUT  /decisions/:id/status  - Advance a decision");
        info!("  GET  /requests              - List feature requests");
        info!("  POST /requests              - Submit a feature request");
        info!("  GET  /requests/:id          - Get a feature request");
        info!("  PUT  /requests/:id/status   - Change request status");
        info!("  POST /requests/:id/votes    - Vote on a request");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// The full application router. Exposed so tests can drive it directly.
pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/version", get(version))
        .merge(routes::participants::router(orchestrator.clone()))
        .nest("/meetings", routes::meetings::router(orchestrator.clone()))
        .nest("/decisions", routes::decisions::router(orchestrator.clone()))
        .nest("/requests", routes::requests::router(orchestrator))
        .layer(ServiceBuilder::new())
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "huddle",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "huddle"
    }))
}
