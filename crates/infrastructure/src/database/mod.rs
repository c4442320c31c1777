//! 数据库连接与模型仓储

pub mod model_repository;

use std::str::FromStr;

use fedimark_errors::FedimarkResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

pub use model_repository::SqliteModelRepository;

/// 创建嵌入式 SQLite 连接池并运行迁移
///
/// 文件不存在时自动创建，启用 WAL 以支持读写并发。
pub async fn connect(database_url: &str, max_connections: u32) -> FedimarkResult<SqlitePool> {
    info!(database_url, "创建SQLite数据库连接池");

    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .connect_with(connect_options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> FedimarkResult<()> {
    debug!("运行数据库迁移");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS model_data (
            acct TEXT PRIMARY KEY NOT NULL,
            data TEXT NOT NULL,
            allow_generate_by_other INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    debug!("数据库迁移完成");
    Ok(())
}
