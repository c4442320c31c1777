//! 手写 mock 实现
//!
//! 各端口的测试替身：可编程分页投稿源、失败投稿源、内存仓储、
//! 记录式进度接收器与训练期崩溃用的分词器。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use fedimark_domain::entities::ModelRecord;
use fedimark_domain::ports::{PostPage, PostRecord, PostSource, ProgressSink, Tokenizer};
use fedimark_domain::repositories::ModelRepository;
use fedimark_errors::{FedimarkError, FedimarkResult};
use tokio::sync::RwLock;

/// 可编程分页投稿源
///
/// 游标是页下标的字符串形式。`with_fallback_pages` 设定后，
/// `include_attachments=true` 的请求改为从回退页集取数。
pub struct MockPostSource {
    pages: Vec<Vec<PostRecord>>,
    fallback_pages: Vec<Vec<PostRecord>>,
    total: Option<u64>,
    pub fetch_calls: AtomicU32,
}

impl MockPostSource {
    pub fn new(pages: Vec<Vec<PostRecord>>) -> Self {
        Self {
            pages,
            fallback_pages: Vec::new(),
            total: None,
            fetch_calls: AtomicU32::new(0),
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_fallback_pages(mut self, pages: Vec<Vec<PostRecord>>) -> Self {
        self.fallback_pages = pages;
        self
    }
}

#[async_trait]
impl PostSource for MockPostSource {
    async fn fetch_page(
        &mut self,
        cursor: Option<String>,
        _page_size: u32,
        include_attachments: bool,
    ) -> FedimarkResult<PostPage> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let pages = if include_attachments && !self.fallback_pages.is_empty() {
            &self.fallback_pages
        } else {
            &self.pages
        };
        let index: usize = match cursor {
            None => 0,
            Some(s) => s.parse().unwrap_or(pages.len()),
        };
        let records = pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };
        Ok(PostPage {
            records,
            next_cursor,
        })
    }

    async fn total_available(&mut self) -> FedimarkResult<Option<u64>> {
        Ok(self.total)
    }
}

/// 第 `fail_at` 次请求返回网络错误的投稿源
pub struct FailingPostSource {
    pages: Vec<Vec<PostRecord>>,
    fail_at: u32,
    calls: u32,
}

impl FailingPostSource {
    pub fn new(pages: Vec<Vec<PostRecord>>, fail_at: u32) -> Self {
        Self {
            pages,
            fail_at,
            calls: 0,
        }
    }
}

#[async_trait]
impl PostSource for FailingPostSource {
    async fn fetch_page(
        &mut self,
        cursor: Option<String>,
        _page_size: u32,
        _include_attachments: bool,
    ) -> FedimarkResult<PostPage> {
        self.calls += 1;
        if self.calls >= self.fail_at {
            return Err(FedimarkError::Network("connection reset".to_string()));
        }
        let index: usize = match cursor {
            None => 0,
            Some(s) => s.parse().unwrap_or(self.pages.len()),
        };
        let records = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < self.pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };
        Ok(PostPage {
            records,
            next_cursor,
        })
    }
}

/// 内存模型仓储
#[derive(Default)]
pub struct MockModelRepository {
    records: RwLock<HashMap<String, ModelRecord>>,
    pub upsert_calls: AtomicU32,
    fail_next_upsert: AtomicBool,
}

impl MockModelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 下一次 upsert 返回可重试错误（之后恢复正常）
    pub fn fail_next_upsert(&self) {
        self.fail_next_upsert.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModelRepository for MockModelRepository {
    async fn upsert(&self, record: &ModelRecord) -> FedimarkResult<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_upsert.swap(false, Ordering::SeqCst) {
            return Err(FedimarkError::DatabaseOperation(
                "database is locked".to_string(),
            ));
        }
        self.records
            .write()
            .await
            .insert(record.acct.clone(), record.clone());
        Ok(())
    }

    async fn find_by_acct(&self, acct: &str) -> FedimarkResult<Option<ModelRecord>> {
        Ok(self.records.read().await.get(acct).cloned())
    }

    async fn delete(&self, acct: &str) -> FedimarkResult<bool> {
        Ok(self.records.write().await.remove(acct).is_some())
    }

    async fn exists(&self, acct: &str) -> FedimarkResult<bool> {
        Ok(self.records.read().await.contains_key(acct))
    }
}

/// 记录每次进度上报的接收器
#[derive(Default)]
pub struct RecordingProgress {
    pub reports: Mutex<Vec<(u64, u64)>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<(u64, u64)> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingProgress {
    async fn report(&self, imported: u64, target: u64) {
        self.reports.lock().unwrap().push((imported, target));
    }
}

/// 训练阶段触发 panic 的分词器（崩溃边界测试用）
pub struct PanickingTokenizer;

impl Tokenizer for PanickingTokenizer {
    fn tokenize(&self, _line: &str) -> String {
        panic!("tokenizer exploded");
    }
}
