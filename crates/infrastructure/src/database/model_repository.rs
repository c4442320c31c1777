//! SQLite 模型仓储
//!
//! 模型记录按 acct 整体替换：同一事务内先删后插。
//! 瞬时错误（锁冲突、池超时）做有界线性退避重试。

use std::time::Duration;

use async_trait::async_trait;
use fedimark_domain::entities::ModelRecord;
use fedimark_domain::repositories::ModelRepository;
use fedimark_errors::{FedimarkError, FedimarkResult};
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 100;

pub struct SqliteModelRepository {
    pool: SqlitePool,
}

impl SqliteModelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn upsert_once(&self, record: &ModelRecord) -> FedimarkResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM model_data WHERE acct = ?")
            .bind(&record.acct)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO model_data (acct, data, allow_generate_by_other, updated_at)
            VALUES (?, ?, ?, datetime('now'))
            "#,
        )
        .bind(&record.acct)
        .bind(&record.data)
        .bind(record.allow_generate_by_other)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ModelRepository for SqliteModelRepository {
    async fn upsert(&self, record: &ModelRecord) -> FedimarkResult<()> {
        let mut attempt = 1;
        loop {
            match self.upsert_once(record).await {
                Ok(()) => {
                    debug!(acct = %record.acct, bytes = record.data.len(), "模型已写入");
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    warn!(acct = %record.acct, attempt, error = %e, "模型写入失败，重试");
                    tokio::time::sleep(Duration::from_millis(
                        RETRY_BASE_DELAY_MS * u64::from(attempt),
                    ))
                    .await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(FedimarkError::persistence_failed(e.to_string()));
                }
            }
        }
    }

    async fn find_by_acct(&self, acct: &str) -> FedimarkResult<Option<ModelRecord>> {
        let row = sqlx::query(
            "SELECT acct, data, allow_generate_by_other FROM model_data WHERE acct = ?",
        )
        .bind(acct)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ModelRecord {
            acct: row.get("acct"),
            data: row.get("data"),
            allow_generate_by_other: row.get("allow_generate_by_other"),
        }))
    }

    async fn delete(&self, acct: &str) -> FedimarkResult<bool> {
        let result = sqlx::query("DELETE FROM model_data WHERE acct = ?")
            .bind(acct)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, acct: &str) -> FedimarkResult<bool> {
        let row = sqlx::query("SELECT 1 FROM model_data WHERE acct = ?")
            .bind(acct)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
