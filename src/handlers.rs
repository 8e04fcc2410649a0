use crate::config::Config;
use crate::errors::AppError;
use crate::generate::TextGenerator;
use crate::job_store::JobStore;
use crate::models::{
    Job, JobStatus, ProvideInputRequest, StartJobRequest, StatusQuery,
};
use crate::pipeline;
use crate::services::{
    MailerService, ProfileEnrichService, ProspectSearchService, WebSearchService,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Job state storage.
    pub store: Arc<dyn JobStore>,
    /// Text-generation capability for parameter derivation and fallbacks.
    pub generator: Arc<dyn TextGenerator>,
    /// People search provider client.
    pub search: ProspectSearchService,
    /// Profile enrichment provider client.
    pub enrich: ProfileEnrichService,
    /// Companion web search client, when configured.
    pub web_search: Option<WebSearchService>,
    /// Outreach mailer client, when configured.
    pub mailer: Option<MailerService>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-prospect-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /start_job
///
/// Accepts a free-text goal, runs the prospect workflow, and stores the
/// result under a fresh job id. The payment id is a placeholder required by
/// the external job-lifecycle convention.
pub async fn start_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartJobRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }

    let job_id = Uuid::new_v4().to_string();
    let payment_id = Uuid::new_v4().to_string();
    tracing::info!("Starting job {}", job_id);

    state
        .store
        .put(Job {
            job_id: job_id.clone(),
            payment_id: payment_id.clone(),
            status: JobStatus::AwaitingPayment,
            created_at: Utc::now(),
            input_data: request.text.clone(),
            result: None,
        })
        .await;

    state
        .store
        .update_status(&job_id, JobStatus::Running, None)
        .await;

    let mailer = if state.config.outreach_enabled {
        state.mailer.as_ref()
    } else {
        None
    };

    let result = pipeline::run_prospect_workflow(
        state.generator.as_ref(),
        &state.search,
        &state.enrich,
        state.web_search.as_ref(),
        mailer,
        &request.text,
    )
    .await;

    state
        .store
        .update_status(&job_id, JobStatus::Completed, Some(result))
        .await;
    tracing::info!("✓ Job {} completed", job_id);

    Ok(Json(json!({
        "status": "success",
        "job_id": job_id,
        "payment_id": payment_id,
    })))
}

/// GET /status?job_id=
///
/// Retrieves the current status and result of a job.
pub async fn check_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let job = state
        .store
        .get(&query.job_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", query.job_id)))?;

    Ok(Json(json!({
        "job_id": job.job_id,
        "status": job.status,
        "result": job.result,
    })))
}

/// POST /provide_input
///
/// Accepts additional input for a job. No job in this service ever waits on
/// extra input, so a known job id is simply acknowledged.
pub async fn provide_input(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProvideInputRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.store.get(&request.job_id).await.is_none() {
        return Err(AppError::NotFound(format!(
            "Job {} not found",
            request.job_id
        )));
    }

    Ok(Json(json!({ "status": "success" })))
}

/// GET /availability
pub async fn availability() -> Json<serde_json::Value> {
    Json(json!({
        "status": "available",
        "message": "The server is running smoothly."
    }))
}

/// GET /input_schema
///
/// Describes the input expected by /start_job.
pub async fn input_schema() -> Json<serde_json::Value> {
    Json(json!({
        "input_data": [
            { "key": "text", "value": "string" }
        ]
    }))
}
