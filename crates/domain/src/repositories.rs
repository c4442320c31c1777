//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则

use async_trait::async_trait;
use fedimark_errors::FedimarkResult;

use crate::entities::ModelRecord;

/// 模型记录仓储抽象（按 acct 的键值式访问）
#[async_trait]
pub trait ModelRepository: Send + Sync {
    /// 整体替换写入：同一事务内先删后插。
    ///
    /// 同一 acct 的并发写采用 last-writer-wins，不做账户级互斥（已知限制）。
    async fn upsert(&self, record: &ModelRecord) -> FedimarkResult<()>;
    async fn find_by_acct(&self, acct: &str) -> FedimarkResult<Option<ModelRecord>>;
    async fn delete(&self, acct: &str) -> FedimarkResult<bool>;
    async fn exists(&self, acct: &str) -> FedimarkResult<bool>;
}
