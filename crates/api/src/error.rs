use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fedimark_errors::FedimarkError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("系统错误: {0}")]
    Fedimark(#[from] FedimarkError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Fedimark(FedimarkError::JobNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("任务 {} 不存在", id),
                "JOB_NOT_FOUND".to_string(),
                vec![
                    "请检查任务ID是否正确".to_string(),
                    "任务结束一小时后会被清理".to_string(),
                ],
            ),
            ApiError::Fedimark(FedimarkError::JobNotTerminal { id }) => (
                StatusCode::CONFLICT,
                format!("任务 {} 尚未结束，无法取走结果", id),
                "JOB_NOT_TERMINAL".to_string(),
                vec!["请用 GET /api/jobs/{id} 轮询直至任务结束".to_string()],
            ),
            ApiError::Fedimark(FedimarkError::ModelNotFound { acct }) => (
                StatusCode::NOT_FOUND,
                format!("{} 的学习数据未找到", acct),
                "MODEL_NOT_FOUND".to_string(),
                vec!["请先通过 POST /api/jobs 导入该账户的投稿".to_string()],
            ),
            ApiError::Fedimark(FedimarkError::GenerationNotAllowed { .. }) => (
                StatusCode::FORBIDDEN,
                "该用户不允许其他用户生成文本".to_string(),
                "GENERATION_NOT_ALLOWED".to_string(),
                vec!["只有数据属主可以生成".to_string()],
            ),
            ApiError::Fedimark(FedimarkError::InvalidRequest(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "INVALID_REQUEST".to_string(),
                vec!["请检查请求格式和参数".to_string()],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST".to_string(),
                vec!["请检查请求格式和参数".to_string()],
            ),
            ApiError::Fedimark(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                e.user_message(),
                "INTERNAL_ERROR".to_string(),
                vec!["系统遇到内部错误，请稍后重试".to_string()],
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    format!("错误详情: {}", msg),
                ],
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_not_found_maps_to_404() {
        let error = ApiError::Fedimark(FedimarkError::job_not_found("abc"));
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_running_job_consume_maps_to_409() {
        let error = ApiError::Fedimark(FedimarkError::JobNotTerminal {
            id: "abc".to_string(),
        });
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_model_not_found_maps_to_404() {
        let error = ApiError::Fedimark(FedimarkError::model_not_found("alice@example.social"));
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_generation_not_allowed_maps_to_403() {
        let error = ApiError::Fedimark(FedimarkError::GenerationNotAllowed {
            acct: "alice@example.social".to_string(),
        });
        assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_bad_request_maps_to_400() {
        let error = ApiError::BadRequest("platform 无效".to_string());
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_errors_map_to_500() {
        let error = ApiError::Fedimark(FedimarkError::Internal("boom".to_string()));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
