//! # fedimark-markov
//!
//! 二阶马尔可夫链文本模型
//!
//! 提供训练 / 生成 / 序列化三个能力，系统其余部分把本 crate 当作黑盒：
//! `train(lines) -> TextModel`、`TextModel::generate(...) -> 词元序列`、
//! `to_json / from_json`。状态以前两个词元为键，行首词元单独记录，
//! 供 startswith 校验与候选提示使用。

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// 链的阶数：每个词元依赖前两个词元
pub const CHAIN_ORDER: usize = 2;

/// 单次游走生成的词元数上限
const MAX_WALK: usize = 200;

const BEGIN: &str = "__BEGIN__";
const END: &str = "__END__";
const STATE_SEP: char = '\u{1f}';

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("语料不足，无法构建模型")]
    InsufficientCorpus,
    #[error("模型序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 训练完成的二阶链模型
///
/// `transitions` 的键是以 U+001F 连接的前两个词元，值是后继词元的出现计数。
/// `starts` 按首次出现顺序保存去重后的行首词元。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextModel {
    order: usize,
    transitions: HashMap<String, HashMap<String, u32>>,
    starts: Vec<String>,
}

fn state_key(first: &str, second: &str) -> String {
    let mut key = String::with_capacity(first.len() + second.len() + 1);
    key.push_str(first);
    key.push(STATE_SEP);
    key.push_str(second);
    key
}

fn weighted_pick<'a>(
    choices: &'a HashMap<String, u32>,
    rng: &mut impl Rng,
) -> Option<&'a String> {
    let total: u64 = choices.values().map(|&c| u64::from(c)).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for (word, &count) in choices {
        let count = u64::from(count);
        if roll < count {
            return Some(word);
        }
        roll -= count;
    }
    None
}

impl TextModel {
    /// 从词元化文本行构建模型
    ///
    /// 每行是一个以空白分隔的词元序列（一句）。没有任何有效行时
    /// 返回 `InsufficientCorpus`。
    pub fn train(lines: &[String]) -> Result<Self, ChainError> {
        let mut transitions: HashMap<String, HashMap<String, u32>> = HashMap::new();
        let mut starts: Vec<String> = Vec::new();
        let mut seen_starts: HashSet<String> = HashSet::new();

        for line in lines {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            if seen_starts.insert(words[0].to_string()) {
                starts.push(words[0].to_string());
            }

            let mut state = (BEGIN.to_string(), BEGIN.to_string());
            for word in &words {
                *transitions
                    .entry(state_key(&state.0, &state.1))
                    .or_default()
                    .entry((*word).to_string())
                    .or_insert(0) += 1;
                state = (state.1, (*word).to_string());
            }
            *transitions
                .entry(state_key(&state.0, &state.1))
                .or_default()
                .entry(END.to_string())
                .or_insert(0) += 1;
        }

        if starts.is_empty() {
            return Err(ChainError::InsufficientCorpus);
        }

        Ok(Self {
            order: CHAIN_ORDER,
            transitions,
            starts,
        })
    }

    /// 单次生成尝试
    ///
    /// `start` 给定时句子必须以该词元开头；词元不是有效的链起点时
    /// 直接返回 None。调用方负责按 min_words 等约束做多次重试。
    pub fn generate(&self, rng: &mut impl Rng, start: Option<&str>) -> Option<Vec<String>> {
        let begin_key = state_key(BEGIN, BEGIN);
        let mut out: Vec<String> = Vec::new();

        let mut state = match start {
            Some(token) => {
                let nexts = self.transitions.get(&begin_key)?;
                if !nexts.contains_key(token) {
                    return None;
                }
                out.push(token.to_string());
                (BEGIN.to_string(), token.to_string())
            }
            None => (BEGIN.to_string(), BEGIN.to_string()),
        };

        for _ in 0..MAX_WALK {
            let key = state_key(&state.0, &state.1);
            let nexts = self.transitions.get(&key)?;
            let next = weighted_pick(nexts, rng)?;
            if next == END {
                break;
            }
            out.push(next.clone());
            state = (state.1, next.clone());
        }

        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    /// 词元是否为有效的链起点
    pub fn is_start_token(&self, token: &str) -> bool {
        let begin_key = state_key(BEGIN, BEGIN);
        self.transitions
            .get(&begin_key)
            .map_or(false, |nexts| nexts.contains_key(token))
    }

    /// 全部链起点词元（按训练时首次出现的顺序）
    pub fn start_tokens(&self) -> &[String] {
        &self.starts
    }

    /// 链的状态数（日志用）
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn to_json(&self) -> Result<String, ChainError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, ChainError> {
        Ok(serde_json::from_str(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_train_rejects_empty_corpus() {
        assert!(matches!(
            TextModel::train(&[]),
            Err(ChainError::InsufficientCorpus)
        ));
        assert!(matches!(
            TextModel::train(&lines(&["", "   "])),
            Err(ChainError::InsufficientCorpus)
        ));
    }

    #[test]
    fn test_single_line_generates_itself() {
        let model = TextModel::train(&lines(&["春 は あけぼの"])).unwrap();
        let mut rng = rand::rng();
        let tokens = model.generate(&mut rng, None).unwrap();
        assert_eq!(tokens, vec!["春", "は", "あけぼの"]);
    }

    #[test]
    fn test_generate_with_valid_start() {
        let model = TextModel::train(&lines(&["a b c", "x y z"])).unwrap();
        let mut rng = rand::rng();
        let tokens = model.generate(&mut rng, Some("x")).unwrap();
        assert_eq!(tokens, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_generate_with_unknown_start_returns_none() {
        let model = TextModel::train(&lines(&["a b c"])).unwrap();
        let mut rng = rand::rng();
        assert!(model.generate(&mut rng, Some("q")).is_none());
        assert!(!model.is_start_token("q"));
        assert!(model.is_start_token("a"));
    }

    #[test]
    fn test_start_tokens_preserve_first_seen_order() {
        let model = TextModel::train(&lines(&["x 1", "y 2", "x 3", "z 4"])).unwrap();
        assert_eq!(model.start_tokens(), ["x", "y", "z"]);
    }

    #[test]
    fn test_json_round_trip() {
        let model = TextModel::train(&lines(&["a b c", "a b d"])).unwrap();
        let json = model.to_json().unwrap();
        let restored = TextModel::from_json(&json).unwrap();
        assert_eq!(restored.start_tokens(), model.start_tokens());
        assert_eq!(restored.state_count(), model.state_count());

        let mut rng = rand::rng();
        let tokens = restored.generate(&mut rng, Some("a")).unwrap();
        assert_eq!(&tokens[..2], ["a", "b"]);
        assert!(tokens[2] == "c" || tokens[2] == "d");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            TextModel::from_json("{not json"),
            Err(ChainError::Serialization(_))
        ));
    }

    #[test]
    fn test_generation_depends_on_previous_two_tokens() {
        // "b" 之后的选择由 (前词, b) 决定：a b -> c，z b -> q
        let model = TextModel::train(&lines(&["a b c", "z b q"])).unwrap();
        let mut rng = rand::rng();
        for _ in 0..20 {
            let tokens = model.generate(&mut rng, Some("a")).unwrap();
            assert_eq!(tokens, vec!["a", "b", "c"]);
        }
    }
}
