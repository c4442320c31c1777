//! # fedimark-infrastructure
//!
//! 基础设施层：嵌入式 SQLite 持久化与反序列化模型缓存

pub mod cache;
pub mod database;

pub use cache::InMemoryModelCache;
pub use database::{connect, SqliteModelRepository};
