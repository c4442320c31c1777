//! 平台投稿源
//!
//! Misskey 与 Mastodon 的 `PostSource` 实现及工厂函数。

pub mod mastodon;
pub mod misskey;

use std::time::Duration;

use fedimark_domain::entities::ImportSession;
use fedimark_domain::ports::PostSource;
use fedimark_domain::value_objects::Platform;
use fedimark_errors::FedimarkResult;

pub use mastodon::MastodonSource;
pub use misskey::MisskeySource;

/// 按会话参数构建对应平台的投稿源
pub fn create_source(
    session: &ImportSession,
    http_timeout: Duration,
) -> FedimarkResult<Box<dyn PostSource>> {
    match session.platform {
        Platform::Misskey => Ok(Box::new(MisskeySource::new(
            &session.hostname,
            &session.user_id,
            &session.token,
            http_timeout,
        )?)),
        Platform::Mastodon => Ok(Box::new(MastodonSource::new(
            &session.hostname,
            &session.user_id,
            &session.token,
            http_timeout,
        )?)),
    }
}
