//! Misskey 投稿源
//!
//! `users/notes` 按 untilId 向历史翻页。`with_attachments` 映射到
//! withFiles 参数，用于空页后的附件投稿回退。

use std::time::Duration;

use async_trait::async_trait;
use fedimark_domain::ports::{PostPage, PostRecord, PostSource};
use fedimark_domain::value_objects::Visibility;
use fedimark_errors::{FedimarkError, FedimarkResult};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

pub struct MisskeySource {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct MisskeyNote {
    id: String,
    text: Option<String>,
    visibility: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MisskeyUser {
    #[serde(rename = "notesCount")]
    notes_count: Option<u64>,
}

impl MisskeySource {
    pub fn new(
        hostname: &str,
        user_id: &str,
        token: &str,
        timeout: Duration,
    ) -> FedimarkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FedimarkError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: format!("https://{hostname}"),
            user_id: user_id.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl PostSource for MisskeySource {
    async fn fetch_page(
        &mut self,
        cursor: Option<String>,
        page_size: u32,
        include_attachments: bool,
    ) -> FedimarkResult<PostPage> {
        let mut body = json!({
            "i": self.token,
            "userId": self.user_id,
            "limit": page_size,
            "includeReplies": false,
            "includeMyRenotes": false,
            "withFiles": include_attachments,
        });
        if let Some(until_id) = cursor {
            body["untilId"] = json!(until_id);
        }

        let resp = self
            .client
            .post(format!("{}/api/users/notes", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| FedimarkError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FedimarkError::import_failed(format!(
                "Misskey API 返回 {}",
                resp.status()
            )));
        }
        let notes: Vec<MisskeyNote> = resp
            .json()
            .await
            .map_err(|e| FedimarkError::Network(e.to_string()))?;

        let next_cursor = notes.last().map(|n| n.id.clone());
        let records = notes
            .into_iter()
            .map(|n| PostRecord {
                id: n.id,
                text: n.text.unwrap_or_default(),
                visibility: Visibility::parse(n.visibility.as_deref().unwrap_or("public")),
            })
            .collect();
        Ok(PostPage {
            records,
            next_cursor,
        })
    }

    async fn total_available(&mut self) -> FedimarkResult<Option<u64>> {
        let body = json!({ "i": self.token, "userId": self.user_id });
        let resp = self
            .client
            .post(format!("{}/api/users/show", self.base_url))
            .json(&body)
            .send()
            .await;
        // 总数只用于收紧目标，查询失败时按请求值继续
        match resp {
            Ok(resp) if resp.status().is_success() => {
                let user: MisskeyUser = resp
                    .json()
                    .await
                    .map_err(|e| FedimarkError::Network(e.to_string()))?;
                Ok(user.notes_count)
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "users/show 查询失败，忽略总数");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "users/show 查询失败，忽略总数");
                Ok(None)
            }
        }
    }
}
