//! 模型训练器
//!
//! 把语料行经分词器转为词元行，再交给链模型训练。
//! 词元化缓冲仅在训练期间存活，函数返回时释放。

use std::sync::Arc;

use fedimark_domain::ports::Tokenizer;
use fedimark_errors::{FedimarkError, FedimarkResult};
use fedimark_markov::TextModel;
use tracing::info;

pub struct ModelTrainer {
    tokenizer: Arc<dyn Tokenizer>,
}

impl ModelTrainer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    pub fn train(&self, lines: &[String]) -> FedimarkResult<TextModel> {
        let tokenized: Vec<String> = lines
            .iter()
            .map(|line| self.tokenizer.tokenize(line))
            .filter(|line| !line.trim().is_empty())
            .collect();

        let model = TextModel::train(&tokenized)
            .map_err(|e| FedimarkError::training_failed(e.to_string()))?;

        info!(
            corpus_lines = tokenized.len(),
            states = model.state_count(),
            "模型训练完成"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceTokenizer;

    fn trainer() -> ModelTrainer {
        ModelTrainer::new(Arc::new(WhitespaceTokenizer))
    }

    #[test]
    fn test_train_builds_model() {
        let lines = vec!["今日 は 晴れ".to_string(), "明日 は 雨".to_string()];
        let model = trainer().train(&lines).unwrap();
        assert!(model.is_start_token("今日"));
        assert!(model.is_start_token("明日"));
    }

    #[test]
    fn test_empty_corpus_maps_to_training_failed() {
        let err = trainer().train(&[]).unwrap_err();
        assert!(matches!(err, FedimarkError::TrainingFailed(_)));
    }

    #[test]
    fn test_whitespace_only_lines_are_dropped() {
        let lines = vec!["   ".to_string(), "\t".to_string()];
        let err = trainer().train(&lines).unwrap_err();
        assert!(matches!(err, FedimarkError::TrainingFailed(_)));
    }
}
