use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use fedimark_api::{create_routes, AppState};
use fedimark_application::{
    GenerationService, ImportOrchestrator, JobRegistry, NoopModelCache, SourceFactory,
};
use fedimark_domain::entities::{ImportSession, ModelRecord};
use fedimark_domain::ports::PostSource;
use fedimark_domain::repositories::ModelRepository;
use fedimark_errors::{FedimarkError, FedimarkResult};
use fedimark_markov::TextModel;
use fedimark_testing_utils::{post, wait_until, MockModelRepository, MockPostSource};
use fedimark_worker::WhitespaceTokenizer;
use serde_json::{json, Value};
use tower::ServiceExt;

/// 把预置投稿源交给第一次导入的工厂
struct QueueFactory(Mutex<Vec<Box<dyn PostSource>>>);

impl SourceFactory for QueueFactory {
    fn create(&self, _session: &ImportSession) -> FedimarkResult<Box<dyn PostSource>> {
        self.0
            .lock()
            .expect("factory lock")
            .pop()
            .ok_or_else(|| FedimarkError::Internal("no source queued".to_string()))
    }
}

struct TestApp {
    router: Router,
    registry: Arc<JobRegistry>,
    repository: Arc<MockModelRepository>,
}

fn test_app(sources: Vec<Box<dyn PostSource>>) -> TestApp {
    let registry = Arc::new(JobRegistry::new(3600));
    let repository = Arc::new(MockModelRepository::new());
    let orchestrator = Arc::new(ImportOrchestrator::new(
        Arc::clone(&registry),
        repository.clone(),
        Arc::new(WhitespaceTokenizer),
        Arc::new(QueueFactory(Mutex::new(sources))),
        40,
    ));
    let generation = Arc::new(GenerationService::new(
        repository.clone(),
        Arc::new(NoopModelCache),
    ));
    let state = AppState {
        registry: Arc::clone(&registry),
        orchestrator,
        generation,
    };
    TestApp {
        router: create_routes(state, true),
        registry,
        repository,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json_body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn import_request() -> Value {
    json!({
        "platform": "misskey",
        "hostname": "example.social",
        "acct": "alice@example.social",
        "user_id": "user-1",
        "token": "test-token",
        "import_size": 1000,
        "visibility": "public_only",
        "allow_generate_by_other": true,
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(vec![]);
    let (status, body) = send(&app.router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "fedimark");
}

#[tokio::test]
async fn test_job_lifecycle_over_http() {
    let source: Box<dyn PostSource> = Box::new(MockPostSource::new(vec![vec![
        post("1", "今日 は 晴れ です"),
        post("2", "明日 は 雨 です"),
    ]]));
    let app = test_app(vec![source]);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/jobs",
        Some(import_request()),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = body["data"]["job_id"].as_str().unwrap().to_string();

    let registry = Arc::clone(&app.registry);
    let id: uuid::Uuid = job_id.parse().unwrap();
    assert!(
        wait_until(
            || async {
                registry
                    .get(id)
                    .await
                    .map(|j| j.is_terminal())
                    .unwrap_or(false)
            },
            Duration::from_secs(5),
        )
        .await
    );

    let (status, body) = send(&app.router, Method::GET, &format!("/api/jobs/{job_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["progress"], 100);
    assert!(body["data"]["error"].is_null());

    // 取走一次后不再可见
    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/api/jobs/{job_id}/consume"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, Method::GET, &format!("/api/jobs/{job_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "JOB_NOT_FOUND");
}

#[tokio::test]
async fn test_consume_running_job_conflicts() {
    let app = test_app(vec![]);
    let job = app.registry.create().await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/api/jobs/{}/consume", job.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "JOB_NOT_TERMINAL");
}

#[tokio::test]
async fn test_create_job_rejects_invalid_parameters() {
    let app = test_app(vec![]);

    let mut bad_platform = import_request();
    bad_platform["platform"] = json!("pleroma");
    let (status, _) = send(&app.router, Method::POST, "/api/jobs", Some(bad_platform)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_size = import_request();
    bad_size["import_size"] = json!(10);
    let (status, _) = send(&app.router, Method::POST, "/api/jobs", Some(bad_size)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut empty_token = import_request();
    empty_token["token"] = json!("");
    let (status, _) = send(&app.router, Method::POST, "/api/jobs", Some(empty_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_job_returns_404() {
    let app = test_app(vec![]);
    let (status, body) = send(
        &app.router,
        Method::GET,
        &format!("/api/jobs/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "JOB_NOT_FOUND");
}

async fn seed_model(repository: &MockModelRepository, acct: &str, allow: bool) {
    let model = TextModel::train(&["今日 は 晴れ".to_string()]).unwrap();
    repository
        .upsert(&ModelRecord {
            acct: acct.to_string(),
            data: model.to_json().unwrap(),
            allow_generate_by_other: allow,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_generate_endpoint() {
    let app = test_app(vec![]);
    seed_model(&app.repository, "alice@example.social", true).await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/generate?acct=alice@example.social",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "generated");
    assert_eq!(body["data"]["text"], "今日は晴れ");
}

#[tokio::test]
async fn test_generate_unknown_account_returns_404() {
    let app = test_app(vec![]);
    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/generate?acct=nobody@example.social",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "MODEL_NOT_FOUND");
}

#[tokio::test]
async fn test_generate_permission_denied_returns_403() {
    let app = test_app(vec![]);
    seed_model(&app.repository, "alice@example.social", false).await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/generate?acct=alice@example.social",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["type"], "GENERATION_NOT_ALLOWED");

    // 属主不受限制
    let (status, _) = send(
        &app.router,
        Method::GET,
        "/api/generate?acct=alice@example.social&requester=alice@example.social",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_model_endpoint() {
    let app = test_app(vec![]);
    seed_model(&app.repository, "alice@example.social", true).await;

    let (status, _) = send(
        &app.router,
        Method::DELETE,
        "/api/models/alice@example.social",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        Method::DELETE,
        "/api/models/alice@example.social",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
