//! 导入任务接口
//!
//! 提交导入、轮询状态与取走最终结果。

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fedimark_domain::entities::{ImportSession, Job};
use fedimark_errors::FedimarkError;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::routes::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub platform: String,
    pub hostname: String,
    pub acct: String,
    pub user_id: String,
    pub token: String,
    pub import_size: u64,
    pub visibility: String,
    #[serde(default)]
    pub allow_generate_by_other: bool,
}

/// POST /api/jobs：提交导入任务，立即返回任务 id
pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, ApiResponse<Value>)> {
    validation::require_non_empty(&req.acct, "acct")?;
    validation::require_non_empty(&req.hostname, "hostname")?;
    validation::require_non_empty(&req.user_id, "user_id")?;
    validation::require_non_empty(&req.token, "token")?;
    let platform = validation::parse_platform(&req.platform)?;
    let visibility = validation::parse_visibility(&req.visibility)?;
    let import_size = validation::validate_import_size(req.import_size)?;

    let session = ImportSession {
        acct: req.acct,
        platform,
        hostname: req.hostname,
        user_id: req.user_id,
        token: req.token,
        import_size,
        visibility,
        allow_generate_by_other: req.allow_generate_by_other,
    };
    let job_id = state.orchestrator.submit(session).await;

    Ok((
        StatusCode::ACCEPTED,
        ApiResponse::success(json!({ "job_id": job_id })),
    ))
}

/// GET /api/jobs/{id}：轮询任务状态
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<Job>> {
    let job = state
        .registry
        .get(id)
        .await
        .ok_or_else(|| FedimarkError::job_not_found(id.to_string()))?;
    Ok(ApiResponse::success(job))
}

/// POST /api/jobs/{id}/consume：取走已终止任务的最终状态
pub async fn consume_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<Job>> {
    let job = state.registry.consume(id).await?;
    Ok(ApiResponse::success(job))
}
