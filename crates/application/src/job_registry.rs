//! 任务注册表
//!
//! 后台任务状态的内存注册表。执行任务的后台 task 是唯一写者，
//! 轮询请求并发读取。终止迁移只发生一次，之后的 succeed/fail 被忽略。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fedimark_domain::entities::Job;
use fedimark_errors::{FedimarkError, FedimarkResult};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, Job>>,
    retention_seconds: i64,
}

impl JobRegistry {
    pub fn new(retention_seconds: i64) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention_seconds,
        }
    }

    /// 登记一个新任务并返回初始快照
    pub async fn create(&self) -> Job {
        let job = Job::new(Uuid::new_v4());
        self.jobs.write().await.insert(job.id, job.clone());
        debug!(job_id = %job.id, "任务已登记");
        job
    }

    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// 更新运行中任务的进度（终止后的更新被忽略）
    pub async fn set_progress(&self, id: Uuid, progress: u8, progress_str: impl Into<String>) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&id) {
            if !job.is_terminal() {
                job.set_progress(progress, progress_str);
            }
        }
    }

    /// 成功终止；任务已终止时忽略
    pub async fn succeed(&self, id: Uuid, result: impl Into<String>) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if !job.is_terminal() => {
                job.succeed(result);
                info!(job_id = %id, "任务成功结束");
            }
            Some(_) => warn!(job_id = %id, "忽略对已终止任务的 succeed"),
            None => warn!(job_id = %id, "succeed 的任务不存在"),
        }
    }

    /// 失败终止；任务已终止时忽略
    pub async fn fail(&self, id: Uuid, error: impl Into<String>) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if !job.is_terminal() => {
                job.fail(error);
                info!(job_id = %id, "任务失败结束");
            }
            Some(_) => warn!(job_id = %id, "忽略对已终止任务的 fail"),
            None => warn!(job_id = %id, "fail 的任务不存在"),
        }
    }

    /// 取走已终止任务的最终状态并从注册表移除
    ///
    /// 运行中的任务不可取走（JobNotTerminal）。
    pub async fn consume(&self, id: Uuid) -> FedimarkResult<Job> {
        let mut jobs = self.jobs.write().await;
        match jobs.remove(&id) {
            None => Err(FedimarkError::job_not_found(id.to_string())),
            Some(job) if !job.is_terminal() => {
                // 运行中的任务放回去
                jobs.insert(id, job);
                Err(FedimarkError::JobNotTerminal {
                    id: id.to_string(),
                })
            }
            Some(job) => Ok(job),
        }
    }

    /// 清理超过保留期的已终止任务，返回清理数
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.is_expired(self.retention_seconds, now));
        let removed = before - jobs.len();
        if removed > 0 {
            info!(removed, "清理过期任务");
        }
        removed
    }

    /// 启动定期清扫的后台任务
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                registry.sweep().await;
            }
        })
    }
}
