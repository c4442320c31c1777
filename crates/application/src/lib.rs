//! # fedimark-application
//!
//! 应用服务层：任务注册表、导入编排器与文本生成服务。
//! 对 api 层暴露用例接口，对 infrastructure 层暴露缓存端口。

pub mod generation;
pub mod job_registry;
pub mod orchestrator;

pub use generation::{GenerateParams, GenerationService, ModelCache, NoopModelCache};
pub use job_registry::JobRegistry;
pub use orchestrator::{HttpSourceFactory, ImportOrchestrator, SourceFactory};
