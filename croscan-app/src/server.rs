//! HTTP adapter: `GET /analyze?url=...` and `GET /health`.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use croscan_common::CroError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::pipeline::Pipeline;

#[derive(Deserialize)]
pub struct AnalyzeQuery {
    url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub result: String,
}

/// Error body shared by every failure: `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<CroError> for ApiError {
    fn from(err: CroError) -> Self {
        // A fetch failure usually means a bad or unreachable input URL.
        let status = if err.is_fetch() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/analyze", get(analyze))
        .route("/health", get(health))
        .with_state(pipeline)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Example: `/analyze?url=https://example.com`
async fn analyze(
    State(pipeline): State<Arc<Pipeline>>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("missing required query parameter `url`"))?;

    let result = pipeline.run(&url).await?;
    Ok(Json(AnalyzeResponse { result }))
}

async fn health(State(pipeline): State<Arc<Pipeline>>) -> impl IntoResponse {
    let llm_reachable = pipeline.llm_reachable().await;
    Json(json!({
        "status": "ok",
        "model": pipeline.model_name(),
        "llm_reachable": llm_reachable,
    }))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(pipeline: Arc<Pipeline>, address: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("croscan listening on http://{address}");

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("croscan stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
