use thiserror::Error;

#[derive(Debug, Error)]
pub enum FedimarkError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("投稿获取失败: {0}")]
    ImportFailed(String),
    #[error("模型训练失败: {0}")]
    TrainingFailed(String),
    #[error("模型保存失败: {0}")]
    PersistenceFailed(String),
    #[error("后台任务异常终止: {kind}: {message}")]
    WorkerCrashed { kind: String, message: String },
    #[error("任务未找到: {id}")]
    JobNotFound { id: String },
    #[error("任务已存在: {id}")]
    JobAlreadyExists { id: String },
    #[error("任务尚未结束: {id}")]
    JobNotTerminal { id: String },
    #[error("学习数据未找到: {acct}")]
    ModelNotFound { acct: String },
    #[error("该用户不允许他人生成文本: {acct}")]
    GenerationNotAllowed { acct: String },
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("网络错误: {0}")]
    Network(String),
    #[error("无效的请求参数: {0}")]
    InvalidRequest(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type FedimarkResult<T> = Result<T, FedimarkError>;

impl FedimarkError {
    pub fn import_failed<S: Into<String>>(msg: S) -> Self {
        Self::ImportFailed(msg.into())
    }
    pub fn training_failed<S: Into<String>>(msg: S) -> Self {
        Self::TrainingFailed(msg.into())
    }
    pub fn persistence_failed<S: Into<String>>(msg: S) -> Self {
        Self::PersistenceFailed(msg.into())
    }
    pub fn worker_crashed<K: Into<String>, M: Into<String>>(kind: K, message: M) -> Self {
        Self::WorkerCrashed {
            kind: kind.into(),
            message: message.into(),
        }
    }
    pub fn job_not_found<S: Into<String>>(id: S) -> Self {
        Self::JobNotFound { id: id.into() }
    }
    pub fn model_not_found<S: Into<String>>(acct: S) -> Self {
        Self::ModelNotFound { acct: acct.into() }
    }
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// 持久化边界的有界重试只对这类错误生效
    pub fn is_retryable(&self) -> bool {
        match self {
            FedimarkError::DatabaseOperation(_) | FedimarkError::Network(_) => true,
            FedimarkError::Database(e) => is_retryable_sqlx(e),
            _ => false,
        }
    }

    /// 面向用户的提示文案（任务状态、生成页面直接展示）
    pub fn user_message(&self) -> String {
        match self {
            FedimarkError::ImportFailed(msg) => format!("投稿获取失败: {msg}"),
            FedimarkError::TrainingFailed(_) => {
                "模型创建失败。用于学习的投稿数量可能不足。".to_string()
            }
            FedimarkError::PersistenceFailed(_) | FedimarkError::Database(_) => {
                "学习数据保存失败，请稍后重试。".to_string()
            }
            FedimarkError::WorkerCrashed { kind, message } => {
                format!("后台任务异常终止: {kind}: {message}")
            }
            FedimarkError::ModelNotFound { acct } => {
                format!("{acct} 的学习数据未找到。")
            }
            FedimarkError::GenerationNotAllowed { .. } => {
                "该用户不允许其他用户生成文本。".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// SQLite 侧的瞬时错误（锁冲突、IO、连接池超时）视为可重试
pub fn is_retryable_sqlx(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => {
            let msg = db_err.message().to_lowercase();
            msg.contains("locked") || msg.contains("busy")
        }
        _ => false,
    }
}

impl From<serde_json::Error> for FedimarkError {
    fn from(err: serde_json::Error) -> Self {
        FedimarkError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for FedimarkError {
    fn from(err: anyhow::Error) -> Self {
        FedimarkError::Internal(err.to_string())
    }
}
