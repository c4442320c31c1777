//! 文本生成服务
//!
//! 按账户取模型（经缓存）并做有界重试生成。startswith 未命中时
//! 以归一化编辑距离给出候选起始词。

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use fedimark_common::constants::{
    GENERATION_MAX_TRIES, MIN_WORDS_MAX, STARTSWITH_MAX_CHARS, SUGGESTION_COUNT,
};
use fedimark_common::utils::bytes::format_bytes;
use fedimark_domain::entities::{GeneratedText, GenerationOutcome, Suggestion};
use fedimark_domain::repositories::ModelRepository;
use fedimark_errors::{FedimarkError, FedimarkResult};
use fedimark_markov::TextModel;
use tracing::{debug, info};

/// 反序列化后模型的缓存端口（infrastructure 提供实现）
///
/// 指纹是模型 JSON 的哈希：数据被重新导入后指纹变化，旧条目失效。
#[async_trait]
pub trait ModelCache: Send + Sync {
    async fn get(&self, acct: &str, fingerprint: u64) -> Option<Arc<TextModel>>;
    async fn insert(
        &self,
        acct: &str,
        fingerprint: u64,
        payload_bytes: usize,
        model: Arc<TextModel>,
    );
    async fn remove(&self, acct: &str);
}

/// 不缓存任何条目的实现（测试及缓存关闭场景）
pub struct NoopModelCache;

#[async_trait]
impl ModelCache for NoopModelCache {
    async fn get(&self, _acct: &str, _fingerprint: u64) -> Option<Arc<TextModel>> {
        None
    }
    async fn insert(
        &self,
        _acct: &str,
        _fingerprint: u64,
        _payload_bytes: usize,
        _model: Arc<TextModel>,
    ) {
    }
    async fn remove(&self, _acct: &str) {}
}

/// 一次生成请求的参数
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub acct: String,
    pub min_words: usize,
    pub startswith: Option<String>,
    /// 请求者是否为模型属主（属主不受 allow_generate_by_other 限制）
    pub requester_is_owner: bool,
}

pub struct GenerationService {
    repository: Arc<dyn ModelRepository>,
    cache: Arc<dyn ModelCache>,
}

fn fingerprint(data: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}

fn rank_suggestions(tokens: &[String], target: &str) -> Vec<Suggestion> {
    let mut scored: Vec<Suggestion> = tokens
        .iter()
        .map(|t| Suggestion {
            token: t.clone(),
            similarity: strsim::normalized_levenshtein(t, target),
        })
        .collect();
    // 稳定排序：同分时保留训练期首次出现的顺序
    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(SUGGESTION_COUNT);
    scored
}

impl GenerationService {
    pub fn new(repository: Arc<dyn ModelRepository>, cache: Arc<dyn ModelCache>) -> Self {
        Self { repository, cache }
    }

    pub async fn generate(&self, params: GenerateParams) -> FedimarkResult<GenerationOutcome> {
        let record = self
            .repository
            .find_by_acct(&params.acct)
            .await?
            .ok_or_else(|| FedimarkError::model_not_found(params.acct.clone()))?;
        if !record.allow_generate_by_other && !params.requester_is_owner {
            return Err(FedimarkError::GenerationNotAllowed {
                acct: params.acct.clone(),
            });
        }

        let fp = fingerprint(&record.data);
        let model = match self.cache.get(&params.acct, fp).await {
            Some(model) => model,
            None => {
                let model = Arc::new(TextModel::from_json(&record.data).map_err(|e| {
                    FedimarkError::Serialization(format!("模型数据损坏: {e}"))
                })?);
                self.cache
                    .insert(&params.acct, fp, record.data.len(), Arc::clone(&model))
                    .await;
                model
            }
        };

        let min_words = params.min_words.clamp(1, MIN_WORDS_MAX);
        let startswith: Option<String> = params
            .startswith
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().take(STARTSWITH_MAX_CHARS).collect());

        if let Some(token) = startswith.as_deref() {
            if !model.is_start_token(token) {
                debug!(acct = %params.acct, token, "起始词未命中，返回候选");
                return Ok(GenerationOutcome::NoResult {
                    startswith_failed: true,
                    suggestions: rank_suggestions(model.start_tokens(), token),
                });
            }
        }

        let mut rng = rand::rng();
        for _ in 0..GENERATION_MAX_TRIES {
            if let Some(tokens) = model.generate(&mut rng, startswith.as_deref()) {
                if tokens.len() >= min_words {
                    let text = tokens.concat();
                    info!(acct = %params.acct, words = tokens.len(), "生成成功");
                    return Ok(GenerationOutcome::Generated(GeneratedText {
                        text,
                        tokens,
                        model_size: format_bytes(record.data.len()),
                    }));
                }
            }
        }

        info!(acct = %params.acct, min_words, "重试耗尽，未生成满足条件的句子");
        Ok(GenerationOutcome::NoResult {
            startswith_failed: false,
            suggestions: Vec::new(),
        })
    }

    /// 删除账户的学习数据（含缓存条目），返回是否存在
    pub async fn delete_model(&self, acct: &str) -> FedimarkResult<bool> {
        self.cache.remove(acct).await;
        let deleted = self.repository.delete(acct).await?;
        if deleted {
            info!(acct, "学习数据已删除");
        }
        Ok(deleted)
    }
}
