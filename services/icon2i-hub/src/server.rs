//! HTTP job adapter.
//!
//! Provides endpoints for:
//! - `POST /processes/icon2i-ingestor/execution` - Run an ingestion
//! - `POST /processes/icon2i-retriever/execution` - Run a retrieval
//! - `GET /health` - Health check

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use icon_common::{HubError, Status};
use pipeline::{Icon2iHub, IngestRequest, RetrieveRequest};

/// Shared state for the HTTP server.
pub struct ServerState {
    /// One run at a time per workspace
    hub: Mutex<Icon2iHub>,
    token: Option<String>,
}

impl ServerState {
    pub fn new(hub: Icon2iHub, token: Option<String>) -> Self {
        Self {
            hub: Mutex::new(hub),
            token,
        }
    }

    /// Check the `token` and `debug` inputs of a job body.
    fn authorize(&self, body: &Value) -> Result<(), HubError> {
        let given = body.get("token").and_then(Value::as_str);
        match (&self.token, given) {
            (Some(expected), Some(given)) if expected == given => {}
            _ => return Err(HubError::denied("ACCESS DENIED: wrong token")),
        }
        match body.get("debug") {
            None | Some(Value::Bool(_)) | Some(Value::Null) => Ok(()),
            Some(_) => Err(HubError::invalid("debug must be a boolean")),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

fn parse_inputs<T: DeserializeOwned>(body: Value) -> Result<T, HubError> {
    serde_json::from_value(body).map_err(|e| HubError::invalid(format!("Invalid inputs: {}", e)))
}

fn error_response(err: &HubError) -> Response {
    let code = StatusCode::from_u16(err.status.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(err.to_json())).into_response()
}

fn outcome<T: Serialize>(id: &Uuid, process: &str, result: Result<T, HubError>) -> Response {
    match result {
        Ok(output) => {
            info!(job_id = %id, process = process, status = %Status::Ok, "Job completed");
            (StatusCode::OK, Json(output)).into_response()
        }
        Err(err) => {
            match err.status {
                Status::Error => error!(job_id = %id, process = process, message = %err.message, "Job failed"),
                _ => warn!(job_id = %id, process = process, status = %err.status, message = %err.message, "Job rejected"),
            }
            error_response(&err)
        }
    }
}

/// POST /processes/icon2i-ingestor/execution
pub async fn ingest_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Response {
    let id = Uuid::new_v4();
    info!(job_id = %id, process = "icon2i-ingestor", "Received job");

    let result = match state.authorize(&body).and_then(|_| parse_inputs::<IngestRequest>(body)) {
        Ok(request) => {
            let hub = state.hub.lock().await;
            hub.ingest(&request, Utc::now()).await
        }
        Err(err) => Err(err),
    };
    outcome(&id, "icon2i-ingestor", result)
}

/// POST /processes/icon2i-retriever/execution
pub async fn retrieve_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Response {
    let id = Uuid::new_v4();
    info!(job_id = %id, process = "icon2i-retriever", "Received job");

    let result = match state.authorize(&body).and_then(|_| parse_inputs::<RetrieveRequest>(body)) {
        Ok(request) => {
            let hub = state.hub.lock().await;
            hub.retrieve(&request, Utc::now()).await
        }
        Err(err) => Err(err),
    };
    outcome(&id, "icon2i-retriever", result)
}

/// GET /health - Health check
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "icon2i-hub".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the HTTP router.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/processes/icon2i-ingestor/execution", post(ingest_handler))
        .route("/processes/icon2i-retriever/execution", post(retrieve_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
}

/// Start the HTTP server.
pub async fn start_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port = port, "Starting icon2i-hub HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
