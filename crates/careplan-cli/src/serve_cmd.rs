use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::Instrument;
use uuid::Uuid;

use careplan_core::{PipelineError, PlanRequest, PlanResult, PlanningPipeline};

pub const HEALTH_MESSAGE: &str = "Healthcare Planning API running";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(_) => Self::unprocessable(err.to_string()),
            PipelineError::Provider(_) => Self::bad_gateway(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(pipeline: PlanningPipeline) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/plan", post(generate_plan))
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(pipeline: PlanningPipeline, bind: &str, port: u16) -> Result<()> {
    let agent = pipeline.agent_name().to_string();
    let app = build_router(pipeline);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!(agent = %agent, "careplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("careplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler; serving until killed");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn root() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_MESSAGE,
    })
}

async fn generate_plan(
    State(pipeline): State<PlanningPipeline>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResult>, AppError> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4();

    async move {
        tracing::info!("plan request received");
        match pipeline.generate_plan(&request).await {
            Ok(result) => {
                tracing::info!(steps = result.resource_check.len(), "plan generated");
                Ok(Json(result))
            }
            Err(e) => {
                tracing::debug!(error = %e, "plan request failed");
                Err(AppError::from(e))
            }
        }
    }
    .instrument(tracing::info_span!("plan_request", %request_id))
    .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
