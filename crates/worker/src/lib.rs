//! # fedimark-worker
//!
//! 导入管道的工作模块：平台投稿源、投稿导入器、模型训练器与分词器。
//! 编排逻辑在 application crate，这里只提供各阶段的执行单元。

pub mod importer;
pub mod sources;
pub mod tokenizer;
pub mod trainer;

pub use importer::{ImportOutcome, PostImporter};
pub use sources::{create_source, MastodonSource, MisskeySource};
pub use tokenizer::WhitespaceTokenizer;
pub use trainer::ModelTrainer;
