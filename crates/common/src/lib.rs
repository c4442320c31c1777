//! # fedimark-common
//!
//! 联邦宇宙马尔可夫文本生成系统的共享工具和常量模块
//!
//! 本模块提供：
//! - 系统常量定义（进度区间、缓存与保留期限制）
//! - 文本工具函数（训练前的正规化、字节数格式化）

pub mod constants;
pub mod utils;

// Re-export commonly used items
pub use constants::*;
pub use utils::*;

// Re-export error types
pub use fedimark_errors::{FedimarkError, FedimarkResult};
