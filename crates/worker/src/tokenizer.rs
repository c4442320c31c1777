//! 分词器实现
//!
//! 默认按空白切分。形态素解析器可通过实现 `Tokenizer` 端口接入，
//! 未分かち書き的 CJK 句子在默认实现下整行作为单个词元。

use fedimark_domain::ports::Tokenizer;

pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, line: &str) -> String {
        line.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
