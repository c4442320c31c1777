//! # fedimark-testing-utils
//!
//! 测试用 mock、构造器与异步断言辅助

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::{post, ImportSessionBuilder};
pub use helpers::wait_until;
pub use mocks::{
    FailingPostSource, MockModelRepository, MockPostSource, PanickingTokenizer, RecordingProgress,
};
