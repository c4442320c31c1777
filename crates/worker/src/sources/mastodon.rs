//! Mastodon 投稿源
//!
//! `accounts/{id}/statuses` 按 max_id 向历史翻页，content 为 HTML，
//! 这里剥离标签并还原常见实体。`with_attachments` 对 Mastodon 无意义，忽略。

use std::time::Duration;

use async_trait::async_trait;
use fedimark_domain::ports::{PostPage, PostRecord, PostSource};
use fedimark_domain::value_objects::Visibility;
use fedimark_errors::{FedimarkError, FedimarkResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

static RE_LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<br\s*/?>|</p>").expect("invalid line break pattern"));
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("invalid tag pattern"));

/// HTML 正文转纯文本：换行标签转 \n，其余标签剥离，实体还原
fn strip_html(html: &str) -> String {
    let text = RE_LINE_BREAK.replace_all(html, "\n");
    let text = RE_TAG.replace_all(&text, "");
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

pub struct MastodonSource {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct MastodonStatus {
    id: String,
    content: String,
    visibility: String,
    reblog: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct MastodonAccount {
    statuses_count: Option<u64>,
}

impl MastodonSource {
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
impl PostSource for MastodonSource {
    async fn fetch_page(
        &mut self,
        cursor: Option<String>,
        page_size: u32,
        _include_attachments: bool,
    ) -> FedimarkResult<PostPage> {
        let mut query: Vec<(&str, String)> = vec![
            ("limit", page_size.to_string()),
            ("exclude_reblogs", "true".to_string()),
        ];
        if let Some(max_id) = cursor {
            query.push(("max_id", max_id));
        }

        let resp = self
            .client
            .get(format!(
                "{}/api/v1/accounts/{}/statuses",
                self.base_url, self.user_id
            ))
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await
            .map_err(|e| FedimarkError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FedimarkError::import_failed(format!(
                "Mastodon API 返回 {}",
                resp.status()
            )));
        }
        let statuses: Vec<MastodonStatus> = resp
            .json()
            .await
            .map_err(|e| FedimarkError::Network(e.to_string()))?;

        let next_cursor = statuses.last().map(|s| s.id.clone());
        let records = statuses
            .into_iter()
            .filter(|s| s.reblog.is_none())
            .map(|s| PostRecord {
                id: s.id,
                text: strip_html(&s.content),
                visibility: Visibility::parse(&s.visibility),
            })
            .collect();
        Ok(PostPage {
            records,
            next_cursor,
        })
    }

    async fn total_available(&mut self) -> FedimarkResult<Option<u64>> {
        let resp = self
            .client
            .get(format!("{}/api/v1/accounts/{}", self.base_url, self.user_id))
            .bearer_auth(&self.token)
            .send()
            .await;
        match resp {
            Ok(resp) if resp.status().is_success() => {
                let account: MastodonAccount = resp
                    .json()
                    .await
                    .map_err(|e| FedimarkError::Network(e.to_string()))?;
                Ok(account.statuses_count)
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "账户查询失败，忽略总数");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "账户查询失败，忽略总数");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_paragraphs_and_breaks() {
        assert_eq!(strip_html("<p>一行目<br>二行目</p>"), "一行目\n二行目");
        assert_eq!(strip_html("<p>段落一</p><p>段落二</p>"), "段落一\n段落二");
    }

    #[test]
    fn test_strip_html_entities_and_links() {
        assert_eq!(
            strip_html(r#"<p>A &amp; B <a href="https://e.com">link</a></p>"#),
            "A & B link"
        );
        assert_eq!(strip_html("&lt;tag&gt; &quot;q&quot; &#39;s&#39;"), "<tag> \"q\" 's'");
    }

    #[test]
    fn test_strip_html_plain_text_untouched() {
        assert_eq!(strip_html("そのままの文章"), "そのままの文章");
    }
}
