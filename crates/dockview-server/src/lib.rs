pub mod config;
pub mod types;
pub mod view;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dockview_common::{ContainerRuntime, DockviewError};
use dockview_runtime::{lifecycle, resolver, Action};
use futures::future::join_all;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, instrument};

use types::{ActionForm, ContainerView};

/// Body returned by every successful action route.
pub const ACTION_ACK: &str = "success";

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<dyn ContainerRuntime>,
}

impl AppState {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }
}

/// Error surfaced to HTTP callers. Details stay in the logs.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Internal,
}

impl From<DockviewError> for ApiError {
    fn from(err: DockviewError) -> Self {
        match err {
            DockviewError::NotFound(message) => ApiError::NotFound(message),
            _ => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        // Lifecycle actions, form-encoded `container_id`
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/restart", post(restart_handler))
        // Machine-readable list
        .route("/api/v1/containers", get(list_containers_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Enumerate every container and resolve each one.
pub async fn collect_views(runtime: &dyn ContainerRuntime) -> Result<Vec<ContainerView>, DockviewError> {
    let records = runtime.list_containers().await?;

    let summaries = join_all(records.iter().map(|r| resolver::resolve(runtime, &r.id))).await;

    Ok(records
        .into_iter()
        .zip(summaries.iter())
        .map(|(record, summary)| ContainerView::new(record, summary))
        .collect())
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let containers = collect_views(state.runtime.as_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to enumerate containers");
        ApiError::from(e)
    })?;
    Ok(Html(view::render_index(&containers)))
}

async fn list_containers_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContainerView>>, ApiError> {
    let containers = collect_views(state.runtime.as_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to enumerate containers");
        ApiError::from(e)
    })?;
    Ok(Json(containers))
}

async fn start_handler(
    State(state): State<AppState>,
    Form(form): Form<ActionForm>,
) -> Result<&'static str, ApiError> {
    run_action(&state, Action::Start, &form.container_id).await
}

async fn stop_handler(
    State(state): State<AppState>,
    Form(form): Form<ActionForm>,
) -> Result<&'static str, ApiError> {
    run_action(&state, Action::Stop, &form.container_id).await
}

async fn restart_handler(
    State(state): State<AppState>,
    Form(form): Form<ActionForm>,
) -> Result<&'static str, ApiError> {
    run_action(&state, Action::Restart, &form.container_id).await
}

// The outcome text is logged by `lifecycle::perform`; callers only get the ack
#[instrument(skip(state))]
async fn run_action(state: &AppState, action: Action, container_id: &str) -> Result<&'static str, ApiError> {
    lifecycle::perform(state.runtime.as_ref(), action, container_id).await?;
    Ok(ACTION_ACK)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let docker_ok = state.runtime.ping().await.is_ok();
    let status = if docker_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if docker_ok { "healthy" } else { "degraded" },
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "components": {
                "docker": if docker_ok { "healthy" } else { "unreachable" },
            }
        })),
    )
}
