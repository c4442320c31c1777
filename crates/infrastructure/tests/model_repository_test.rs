use fedimark_domain::entities::ModelRecord;
use fedimark_domain::repositories::ModelRepository;
use fedimark_infrastructure::{connect, SqliteModelRepository};

async fn repository() -> SqliteModelRepository {
    let pool = connect("sqlite::memory:", 1).await.expect("connect memory db");
    SqliteModelRepository::new(pool)
}

fn record(acct: &str, data: &str) -> ModelRecord {
    ModelRecord {
        acct: acct.to_string(),
        data: data.to_string(),
        allow_generate_by_other: true,
    }
}

#[tokio::test]
async fn test_upsert_and_find() {
    let repo = repository().await;
    repo.upsert(&record("alice@example.social", r#"{"order":2}"#))
        .await
        .unwrap();

    let found = repo.find_by_acct("alice@example.social").await.unwrap().unwrap();
    assert_eq!(found.acct, "alice@example.social");
    assert_eq!(found.data, r#"{"order":2}"#);
    assert!(found.allow_generate_by_other);

    assert!(repo.find_by_acct("bob@example.social").await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_replaces_previous_record() {
    let repo = repository().await;
    repo.upsert(&record("alice@example.social", "old")).await.unwrap();

    let mut updated = record("alice@example.social", "new");
    updated.allow_generate_by_other = false;
    repo.upsert(&updated).await.unwrap();

    let found = repo.find_by_acct("alice@example.social").await.unwrap().unwrap();
    assert_eq!(found.data, "new");
    assert!(!found.allow_generate_by_other);
}

#[tokio::test]
async fn test_delete_and_exists() {
    let repo = repository().await;
    repo.upsert(&record("alice@example.social", "data")).await.unwrap();

    assert!(repo.exists("alice@example.social").await.unwrap());
    assert!(repo.delete("alice@example.social").await.unwrap());
    assert!(!repo.exists("alice@example.social").await.unwrap());
    // 再次删除返回 false
    assert!(!repo.delete("alice@example.social").await.unwrap());
}

#[tokio::test]
async fn test_accounts_are_isolated() {
    let repo = repository().await;
    repo.upsert(&record("alice@example.social", "alice-data")).await.unwrap();
    repo.upsert(&record("bob@example.social", "bob-data")).await.unwrap();

    repo.delete("alice@example.social").await.unwrap();
    let bob = repo.find_by_acct("bob@example.social").await.unwrap().unwrap();
    assert_eq!(bob.data, "bob-data");
}
