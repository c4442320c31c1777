//! 文本生成与学习数据接口

use axum::extract::{Path, Query, State};
use fedimark_application::GenerateParams;
use fedimark_domain::entities::GenerationOutcome;
use fedimark_errors::FedimarkError;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::routes::AppState;
use crate::validation;

fn default_min_words() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    pub acct: String,
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    pub startswith: Option<String>,
    /// 请求者的 acct（与目标一致时视为属主）
    pub requester: Option<String>,
}

/// GET /api/generate：按账户模型生成一句
pub async fn generate(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> ApiResult<ApiResponse<GenerationOutcome>> {
    validation::require_non_empty(&query.acct, "acct")?;
    let requester_is_owner = query.requester.as_deref() == Some(query.acct.as_str());
    let outcome = state
        .generation
        .generate(GenerateParams {
            acct: query.acct,
            min_words: query.min_words,
            startswith: query.startswith,
            requester_is_owner,
        })
        .await?;
    Ok(ApiResponse::success(outcome))
}

/// DELETE /api/models/{acct}：删除账户的学习数据
pub async fn delete_model(
    State(state): State<AppState>,
    Path(acct): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    if !state.generation.delete_model(&acct).await? {
        return Err(FedimarkError::model_not_found(acct).into());
    }
    Ok(ApiResponse::success_empty_with_message(
        "学习数据已删除".to_string(),
    ))
}
