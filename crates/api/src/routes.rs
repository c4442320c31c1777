use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use fedimark_application::{GenerationService, ImportOrchestrator, JobRegistry};

use crate::handlers::{
    generate::{delete_model, generate},
    health::health_check,
    jobs::{consume_job, create_job, get_job},
};
use crate::middleware::{cors_layer, request_logging, trace_layer};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
    pub orchestrator: Arc<ImportOrchestrator>,
    pub generation: Arc<GenerationService>,
}

/// 创建API路由
pub fn create_routes(state: AppState, cors_enabled: bool) -> Router {
    let router = Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 导入任务API
        .route("/api/jobs", post(create_job))
        .route("/api/jobs/{id}", get(get_job))
        .route("/api/jobs/{id}/consume", post(consume_job))
        // 生成与学习数据API
        .route("/api/generate", get(generate))
        .route("/api/models/{acct}", delete(delete_model))
        .with_state(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(trace_layer());

    if cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}
