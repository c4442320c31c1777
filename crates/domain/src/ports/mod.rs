//! 出站端口
//!
//! 管道执行所依赖的外部能力抽象：分页投稿源、分词器、进度上报。

use async_trait::async_trait;
use fedimark_errors::FedimarkResult;

use crate::value_objects::Visibility;

/// 外部服务返回的单条投稿
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: String,
    pub text: String,
    pub visibility: Visibility,
}

/// 一页投稿及翻页游标
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub records: Vec<PostRecord>,
    pub next_cursor: Option<String>,
}

/// 分页投稿获取能力
///
/// 错误不在实现内部重试，直接向上传播为导入失败。
#[async_trait]
pub trait PostSource: Send {
    /// 获取一页投稿
    ///
    /// `include_attachments` 为 Misskey 类平台的回退开关：
    /// 空页后再以包含附件投稿的方式重试一轮。
    async fn fetch_page(
        &mut self,
        cursor: Option<String>,
        page_size: u32,
        include_attachments: bool,
    ) -> FedimarkResult<PostPage>;

    /// 目标账户可导入的投稿总数（未知时返回 None，以请求值为准）
    async fn total_available(&mut self) -> FedimarkResult<Option<u64>> {
        Ok(None)
    }
}

/// 形态素分词能力（注入）
///
/// 输出为以空白分隔的词元串（wakati 形式）。
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, line: &str) -> String;
}

/// 导入进度上报
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, imported: u64, target: u64);
}
