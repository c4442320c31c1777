//! 应用装配
//!
//! 按配置装配各层组件并启动 HTTP 服务。

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fedimark_api::{create_routes, AppState};
use fedimark_application::{
    GenerationService, HttpSourceFactory, ImportOrchestrator, JobRegistry,
};
use fedimark_config::AppConfig;
use fedimark_infrastructure::{connect, InMemoryModelCache, SqliteModelRepository};
use fedimark_worker::WhitespaceTokenizer;
use tokio::sync::broadcast;
use tracing::info;

/// 过期任务清扫间隔
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct Application {
    config: AppConfig,
    registry: Arc<JobRegistry>,
    router: axum::Router,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = connect(&config.database.url, config.database.max_connections)
            .await
            .context("数据库初始化失败")?;
        let repository = Arc::new(SqliteModelRepository::new(pool));

        let registry = Arc::new(JobRegistry::new(config.jobs.retention_seconds));
        let cache = Arc::new(InMemoryModelCache::new(
            config.cache.capacity,
            Duration::from_secs(config.cache.ttl_seconds),
            config.cache.min_payload_bytes,
        ));

        let orchestrator = Arc::new(ImportOrchestrator::new(
            Arc::clone(&registry),
            repository.clone(),
            Arc::new(WhitespaceTokenizer),
            Arc::new(HttpSourceFactory::new(Duration::from_secs(
                config.import.http_timeout_seconds,
            ))),
            config.import.page_size,
        ));
        let generation = Arc::new(GenerationService::new(repository, cache));

        let state = AppState {
            registry: Arc::clone(&registry),
            orchestrator,
            generation,
        };
        let router = create_routes(state, config.api.cors_enabled);

        Ok(Self {
            config,
            registry,
            router,
        })
    }

    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let sweeper = self.registry.start_sweeper(SWEEP_INTERVAL);

        let listener = tokio::net::TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;
        info!(bind_address = %self.config.api.bind_address, "HTTP服务已启动");

        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
            .context("HTTP服务异常退出")?;

        sweeper.abort();
        info!("HTTP服务已停止");
        Ok(())
    }
}
