//! # 系统常量定义
//!
//! 包含任务进度区间、导入上限、缓存与保留期等常量

/// 系统名称
pub const SYSTEM_NAME: &str = "fedimark";

/// 系统版本
pub const SYSTEM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 进入投稿获取阶段的进度（导入区间下限）
pub const PROGRESS_FETCH_START: u8 = 15;

/// 投稿获取阶段的进度上限
pub const PROGRESS_FETCH_END: u8 = 80;

/// 进入模型训练阶段的进度
pub const PROGRESS_TRAIN: u8 = 80;

/// 进入持久化阶段的进度
pub const PROGRESS_PERSIST: u8 = 90;

/// 已完成任务的保留期（秒），超过后由清扫回收
pub const JOB_RETENTION_SECONDS: i64 = 3600;

/// 导入投稿数下限
pub const IMPORT_SIZE_MIN: u64 = 1_000;

/// 导入投稿数上限
pub const IMPORT_SIZE_MAX: u64 = 1_000_000;

/// 计入导入数所需的最短投稿文本长度（字符数，含边界不计入）
pub const MIN_POST_TEXT_CHARS: usize = 2;

/// 模型缓存容量（条目数）
pub const MODEL_CACHE_CAPACITY: usize = 5;

/// 模型缓存条目有效期（秒）
pub const MODEL_CACHE_TTL_SECONDS: u64 = 300;

/// 只缓存序列化形式超过该字节数的模型
pub const MODEL_CACHE_MIN_PAYLOAD_BYTES: usize = 1024 * 1024;

/// 单次生成的内部重试次数上限
pub const GENERATION_MAX_TRIES: u32 = 100;

/// 生成最短词数的钳制上限
pub const MIN_WORDS_MAX: usize = 50;

/// startswith 参数的最大长度（字符数）
pub const STARTSWITH_MAX_CHARS: usize = 10;

/// startswith 未命中时返回的候选数
pub const SUGGESTION_COUNT: usize = 5;
