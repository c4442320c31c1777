use std::sync::Arc;
use std::time::Duration;

use fedimark_application::JobRegistry;
use fedimark_domain::entities::JobState;
use fedimark_errors::FedimarkError;
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_poll() {
    let registry = JobRegistry::new(3600);
    let job = registry.create().await;
    let polled = registry.get(job.id).await.unwrap();
    assert_eq!(polled.state(), JobState::Running);
    assert_eq!(polled.progress, 1);
}

#[tokio::test]
async fn test_unknown_job_returns_none() {
    let registry = JobRegistry::new(3600);
    assert!(registry.get(Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn test_terminal_transition_happens_once() {
    let registry = JobRegistry::new(3600);
    let job = registry.create().await;

    registry.succeed(job.id, "done").await;
    // 之后的 fail 与进度更新都被忽略
    registry.fail(job.id, "too late").await;
    registry.set_progress(job.id, 50, "late update").await;

    let polled = registry.get(job.id).await.unwrap();
    assert_eq!(polled.state(), JobState::Succeeded);
    assert_eq!(polled.progress, 100);
    assert!(polled.error.is_none());
}

#[tokio::test]
async fn test_progress_updates_are_monotonic() {
    let registry = JobRegistry::new(3600);
    let job = registry.create().await;

    registry.set_progress(job.id, 40, "获取投稿中").await;
    registry.set_progress(job.id, 20, "获取投稿中").await;
    assert_eq!(registry.get(job.id).await.unwrap().progress, 40);
}

#[tokio::test]
async fn test_consume_requires_terminal_state() {
    let registry = JobRegistry::new(3600);
    let job = registry.create().await;

    let err = registry.consume(job.id).await.unwrap_err();
    assert!(matches!(err, FedimarkError::JobNotTerminal { .. }));
    // 拒绝取走后任务仍在
    assert!(registry.get(job.id).await.is_some());

    registry.fail(job.id, "网络错误").await;
    let consumed = registry.consume(job.id).await.unwrap();
    assert_eq!(consumed.state(), JobState::Failed);

    let err = registry.consume(job.id).await.unwrap_err();
    assert!(matches!(err, FedimarkError::JobNotFound { .. }));
}

#[tokio::test]
async fn test_sweep_removes_only_expired_terminal_jobs() {
    let registry = Arc::new(JobRegistry::new(0));
    let running = registry.create().await;
    let finished = registry.create().await;
    registry.succeed(finished.id, "done").await;

    tokio::time::sleep(Duration::from_millis(1100)).await;
    let removed = registry.sweep().await;

    assert_eq!(removed, 1);
    assert!(registry.get(running.id).await.is_some());
    assert!(registry.get(finished.id).await.is_none());
}
