//! 测试数据构造器

use fedimark_domain::entities::ImportSession;
use fedimark_domain::ports::PostRecord;
use fedimark_domain::value_objects::{ImportVisibility, Platform, Visibility};

/// 快速构造一条公开投稿
pub fn post(id: &str, text: &str) -> PostRecord {
    PostRecord {
        id: id.to_string(),
        text: text.to_string(),
        visibility: Visibility::Public,
    }
}

pub struct ImportSessionBuilder {
    session: ImportSession,
}

impl Default for ImportSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSessionBuilder {
    pub fn new() -> Self {
        Self {
            session: ImportSession {
                acct: "alice@example.social".to_string(),
                platform: Platform::Misskey,
                hostname: "example.social".to_string(),
                user_id: "user-1".to_string(),
                token: "test-token".to_string(),
                import_size: 1_000,
                visibility: ImportVisibility::PublicOnly,
                allow_generate_by_other: true,
            },
        }
    }

    pub fn acct(mut self, acct: &str) -> Self {
        self.session.acct = acct.to_string();
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.session.platform = platform;
        self
    }

    pub fn import_size(mut self, size: u64) -> Self {
        self.session.import_size = size;
        self
    }

    pub fn visibility(mut self, visibility: ImportVisibility) -> Self {
        self.session.visibility = visibility;
        self
    }

    pub fn allow_generate_by_other(mut self, allow: bool) -> Self {
        self.session.allow_generate_by_other = allow;
        self
    }

    pub fn build(self) -> ImportSession {
        self.session
    }
}
