//! # 通用工具函数
//!
//! 训练语料正规化与展示用格式化

/// 文本工具函数
pub mod text {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static RE_URL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?:https?|ftp)://\S+").expect("invalid url pattern")
    });
    static RE_SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"([。．！？…!?])[ \t\n]+").expect("invalid sentence break pattern")
    });
    static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("invalid pattern"));
    static RE_NEWLINE_SPACE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\n[ \t]+").expect("invalid pattern"));
    static RE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("invalid pattern"));

    /// 训练前的一行文本清洗
    ///
    /// 1. 全角空格转半角
    /// 2. 去除裸 URL（http/https/ftp）
    /// 3. 句末标点后接续内容时插入换行
    /// 4. 折叠连续空白与连续换行
    ///
    /// 纯函数、全定义域、幂等：normalize(normalize(x)) == normalize(x)。
    pub fn normalize(line: &str) -> String {
        let text = line.replace('\u{3000}', " ");
        let text = RE_URL.replace_all(&text, "");
        let text = RE_SENTENCE_BREAK.replace_all(&text, "$1\n");
        let text = RE_SPACES.replace_all(&text, " ");
        let text = RE_NEWLINE_SPACE.replace_all(&text, "\n");
        let text = RE_NEWLINES.replace_all(&text, "\n");
        text.trim().to_string()
    }
}

/// 字节数格式化
pub mod bytes {
    /// 转换字节数为人类可读形式（B, KB, MB, …）
    pub fn format_bytes(size: usize) -> String {
        const POWER: f64 = 1024.0;
        const LABELS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

        let mut size = size as f64;
        let mut n = 0;
        while size > POWER && n < LABELS.len() - 1 {
            size /= POWER;
            n += 1;
        }
        format!("{:.0} {}", size, LABELS[n])
    }
}
