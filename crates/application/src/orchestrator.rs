//! 导入编排器
//!
//! 把一次导入请求编排成后台管道：获取 → 训练 → 持久化，
//! 进度写入任务注册表。管道 task 之外再挂一个监督 task，
//! 把 panic 等非正常终止折算成任务失败，保证终止迁移总会发生。

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fedimark_common::constants::{
    IMPORT_SIZE_MAX, IMPORT_SIZE_MIN, PROGRESS_FETCH_END, PROGRESS_FETCH_START, PROGRESS_PERSIST,
    PROGRESS_TRAIN,
};
use fedimark_domain::entities::{ImportSession, ModelRecord};
use fedimark_domain::ports::{PostSource, ProgressSink, Tokenizer};
use fedimark_domain::repositories::ModelRepository;
use fedimark_errors::{FedimarkError, FedimarkResult};
use fedimark_worker::{create_source, ImportOutcome, ModelTrainer, PostImporter};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::job_registry::JobRegistry;

/// 投稿源构造抽象（测试时注入 mock 源）
pub trait SourceFactory: Send + Sync {
    fn create(&self, session: &ImportSession) -> FedimarkResult<Box<dyn PostSource>>;
}

/// 生产用工厂：按会话的平台与实例构建 HTTP 投稿源
pub struct HttpSourceFactory {
    http_timeout: Duration,
}

impl HttpSourceFactory {
    pub fn new(http_timeout: Duration) -> Self {
        Self { http_timeout }
    }
}

impl SourceFactory for HttpSourceFactory {
    fn create(&self, session: &ImportSession) -> FedimarkResult<Box<dyn PostSource>> {
        create_source(session, self.http_timeout)
    }
}

/// 把导入计数折算到进度区间 [15, 80] 并写入注册表
struct JobProgressSink {
    registry: Arc<JobRegistry>,
    job_id: Uuid,
}

#[async_trait]
impl ProgressSink for JobProgressSink {
    async fn report(&self, imported: u64, target: u64) {
        let ratio = imported as f64 / target.max(1) as f64;
        let span = f64::from(PROGRESS_FETCH_END - PROGRESS_FETCH_START);
        let percent =
            (f64::from(PROGRESS_FETCH_START) + ratio * span).floor() as u8;
        self.registry
            .set_progress(
                self.job_id,
                percent.min(PROGRESS_FETCH_END),
                format!("获取投稿中 ({imported}/{target})"),
            )
            .await;
    }
}

pub struct ImportOrchestrator {
    registry: Arc<JobRegistry>,
    repository: Arc<dyn ModelRepository>,
    tokenizer: Arc<dyn Tokenizer>,
    source_factory: Arc<dyn SourceFactory>,
    page_size: u32,
}

impl ImportOrchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        repository: Arc<dyn ModelRepository>,
        tokenizer: Arc<dyn Tokenizer>,
        source_factory: Arc<dyn SourceFactory>,
        page_size: u32,
    ) -> Self {
        Self {
            registry,
            repository,
            tokenizer,
            source_factory,
            page_size,
        }
    }

    /// 提交一次导入，立即返回任务 id
    pub async fn submit(&self, mut session: ImportSession) -> Uuid {
        session.import_size = session.import_size.clamp(IMPORT_SIZE_MIN, IMPORT_SIZE_MAX);
        let job = self.registry.create().await;
        let job_id = job.id;
        info!(job_id = %job_id, acct = %session.acct, platform = session.platform.as_str(), "提交导入任务");

        let registry = Arc::clone(&self.registry);
        let repository = Arc::clone(&self.repository);
        let tokenizer = Arc::clone(&self.tokenizer);
        let source_factory = Arc::clone(&self.source_factory);
        let page_size = self.page_size;

        let pipeline = tokio::spawn({
            let registry = Arc::clone(&registry);
            async move {
                run_pipeline(
                    registry,
                    repository,
                    tokenizer,
                    source_factory,
                    page_size,
                    session,
                    job_id,
                )
                .await
            }
        });

        // 监督 task：管道 panic 时折算为 WorkerCrashed 失败
        tokio::spawn(async move {
            match pipeline.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(job_id = %job_id, error = %e, "导入管道失败");
                    registry.fail(job_id, e.user_message()).await;
                }
                Err(join_err) => {
                    let crashed = if join_err.is_panic() {
                        let payload = join_err.into_panic();
                        let message = payload
                            .downcast_ref::<&str>()
                            .map(|s| (*s).to_string())
                            .or_else(|| payload.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "unknown panic".to_string());
                        FedimarkError::worker_crashed("panic", message)
                    } else {
                        FedimarkError::worker_crashed("cancelled", "任务被取消")
                    };
                    error!(job_id = %job_id, error = %crashed, "导入管道异常终止");
                    registry.fail(job_id, crashed.user_message()).await;
                }
            }
        });

        job_id
    }
}

async fn run_pipeline(
    registry: Arc<JobRegistry>,
    repository: Arc<dyn ModelRepository>,
    tokenizer: Arc<dyn Tokenizer>,
    source_factory: Arc<dyn SourceFactory>,
    page_size: u32,
    session: ImportSession,
    job_id: Uuid,
) -> FedimarkResult<()> {
    let started = Instant::now();

    registry
        .set_progress(job_id, PROGRESS_FETCH_START, "获取投稿中")
        .await;
    let mut source = source_factory.create(&session)?;
    let progress = JobProgressSink {
        registry: Arc::clone(&registry),
        job_id,
    };
    let importer = PostImporter::new(page_size);
    let ImportOutcome { lines, imported } = importer
        .run(
            source.as_mut(),
            session.import_size,
            session.visibility,
            &progress,
        )
        .await?;
    drop(source);

    registry
        .set_progress(job_id, PROGRESS_TRAIN, "训练模型中")
        .await;
    let trainer = ModelTrainer::new(tokenizer);
    let model = trainer.train(&lines)?;
    // 原始语料行在训练后立即释放，持久化阶段只保留序列化后的模型
    drop(lines);

    registry
        .set_progress(job_id, PROGRESS_PERSIST, "保存学习数据中")
        .await;
    let data = model
        .to_json()
        .map_err(|e| FedimarkError::persistence_failed(e.to_string()))?;
    drop(model);
    let record = ModelRecord {
        acct: session.acct.clone(),
        data,
        allow_generate_by_other: session.allow_generate_by_other,
    };
    repository.upsert(&record).await?;

    let elapsed_ms = started.elapsed().as_millis();
    info!(job_id = %job_id, acct = %session.acct, imported, elapsed_ms, "导入管道完成");
    registry
        .succeed(
            job_id,
            format!("导入 {} 条投稿，耗时 {} ms", imported, elapsed_ms),
        )
        .await;
    Ok(())
}
