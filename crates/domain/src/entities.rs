use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{ImportVisibility, Platform};

/// 后台导入任务的注册表条目
///
/// 单写者（执行该任务的后台task）更新，任意轮询者并发读取。
/// 不变量：
/// - `completed == false` 时 `error` 与 `result` 均为 None
/// - `completed == true` 时 `completed_at` 已设置
/// - 运行期间 `progress` 单调非降
/// - 终止迁移（成功或失败）恰好发生一次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub completed: bool,
    pub error: Option<String>,
    pub progress: u8,
    pub progress_str: String,
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// 对外暴露的任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Succeeded,
    Failed,
}

impl Job {
    /// 创建处于"初始化中"状态的新任务（progress=1）
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            completed: false,
            error: None,
            progress: 1,
            progress_str: "初始化中".to_string(),
            result: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn state(&self) -> JobState {
        if !self.completed {
            JobState::Running
        } else if self.error.is_some() {
            JobState::Failed
        } else {
            JobState::Succeeded
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.completed
    }

    /// 更新进度；进度只会前进，回退的值被钳制
    pub fn set_progress(&mut self, progress: u8, progress_str: impl Into<String>) {
        self.progress = self.progress.max(progress.min(100));
        self.progress_str = progress_str.into();
    }

    /// 成功终止
    pub fn succeed(&mut self, result: impl Into<String>) {
        self.completed = true;
        self.error = None;
        self.progress = 100;
        self.progress_str = "完成".to_string();
        self.result = Some(result.into());
        self.completed_at = Some(Utc::now());
    }

    /// 失败终止
    pub fn fail(&mut self, error: impl Into<String>) {
        self.completed = true;
        self.error = Some(error.into());
        self.result = None;
        self.completed_at = Some(Utc::now());
    }

    /// 终止后是否超过保留期（可被清扫回收）
    pub fn is_expired(&self, retention_seconds: i64, now: DateTime<Utc>) -> bool {
        match (self.completed, self.completed_at) {
            (true, Some(at)) => (now - at).num_seconds() > retention_seconds,
            _ => false,
        }
    }
}

/// 一次导入任务的会话参数
///
/// 由编排器在任务生命周期内持有，不落库。
#[derive(Debug, Clone)]
pub struct ImportSession {
    /// 账户标识（平台限定的 handle，如 alice@example.social）
    pub acct: String,
    pub platform: Platform,
    /// 实例主机名
    pub hostname: String,
    /// 平台侧用户 id（Misskey 必需，Mastodon 为账户 id）
    pub user_id: String,
    /// 访问令牌
    pub token: String,
    /// 请求导入的投稿数上限
    pub import_size: u64,
    pub visibility: ImportVisibility,
    /// 是否允许其他用户用该模型生成文本
    pub allow_generate_by_other: bool,
}

/// 按账户持久化的模型记录（acct 唯一键，导入即整体替换）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub acct: String,
    /// 模型的 JSON 序列化形式
    pub data: String,
    pub allow_generate_by_other: bool,
}

/// 生成结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedText {
    /// 连接后的完整句子
    pub text: String,
    /// 生成时的词元序列（展示层按词元渲染）
    pub tokens: Vec<String>,
    /// 模型数据大小（人类可读）
    pub model_size: String,
}

/// startswith 未命中时的候选起始词
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub token: String,
    /// 归一化编辑距离相似度，[0,1]
    pub similarity: f64,
}

/// 一次生成请求的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Generated(GeneratedText),
    NoResult {
        /// 失败是否由未命中的起始词导致
        startswith_failed: bool,
        suggestions: Vec<Suggestion>,
    },
}
