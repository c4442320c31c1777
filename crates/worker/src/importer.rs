//! 投稿导入器
//!
//! 从投稿源分页拉取、按可见性过滤、清洗文本并产出训练语料行。

use fedimark_common::constants::MIN_POST_TEXT_CHARS;
use fedimark_common::utils::text::normalize;
use fedimark_domain::ports::{PostSource, ProgressSink};
use fedimark_domain::value_objects::ImportVisibility;
use fedimark_errors::FedimarkResult;
use tracing::{debug, info};

/// 一次导入的产出
#[derive(Debug)]
pub struct ImportOutcome {
    /// 清洗后的语料行（每行一句）
    pub lines: Vec<String>,
    /// 计入的投稿数（清洗后文本过短的投稿不计）
    pub imported: u64,
}

/// 分页导入执行器
///
/// 逐页处理：一页内的投稿过滤、清洗并入语料后整页释放，
/// 任意时刻只持有一页原始数据。
pub struct PostImporter {
    page_size: u32,
}

impl PostImporter {
    pub fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// 执行导入
    ///
    /// 目标数取请求值与账户实际投稿数的较小者。投稿源返回空页且
    /// 尚未启用附件回退时，以包含附件投稿的方式重试一次，之后视为到底。
    pub async fn run(
        &self,
        source: &mut (dyn PostSource + '_),
        import_size: u64,
        visibility: ImportVisibility,
        progress: &dyn ProgressSink,
    ) -> FedimarkResult<ImportOutcome> {
        let target = match source.total_available().await? {
            Some(n) if n > 0 => import_size.min(n),
            _ => import_size,
        };
        info!(target, "开始导入投稿");

        let mut lines: Vec<String> = Vec::new();
        let mut imported: u64 = 0;
        let mut cursor: Option<String> = None;
        let mut with_attachments = false;

        'pages: loop {
            let page = source
                .fetch_page(cursor.clone(), self.page_size, with_attachments)
                .await?;

            if page.records.is_empty() {
                if !with_attachments {
                    debug!("投稿源返回空页，以包含附件投稿的方式重试");
                    with_attachments = true;
                    continue;
                }
                break;
            }

            for record in &page.records {
                if !visibility.admits(record.visibility) {
                    continue;
                }
                let text = normalize(&record.text);
                if text.chars().count() <= MIN_POST_TEXT_CHARS {
                    continue;
                }
                imported += 1;
                for line in text.split('\n') {
                    if !line.is_empty() {
                        lines.push(line.to_string());
                    }
                }
                if imported >= target {
                    progress.report(imported.min(target), target).await;
                    break 'pages;
                }
            }

            progress.report(imported.min(target), target).await;

            cursor = page.next_cursor;
            if cursor.is_none() {
                break;
            }
        }

        info!(imported, corpus_lines = lines.len(), "投稿导入结束");
        Ok(ImportOutcome { lines, imported })
    }
}
