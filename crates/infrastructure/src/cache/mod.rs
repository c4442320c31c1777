//! 缓存实现

pub mod model_cache;

pub use model_cache::InMemoryModelCache;
