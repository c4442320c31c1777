use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validation::{ConfigValidator, ValidationUtils};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub import: ImportConfig,
    pub cache: CacheConfig,
    pub jobs: JobsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 数据库路径（sqlite: 前缀）
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 每页获取的投稿数（平台 API 通常限制在 40-100）
    pub page_size: u32,
    /// 外部 API 单次请求超时（秒）
    pub http_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_seconds: u64,
    /// 序列化形式小于该字节数的模型不进缓存
    pub min_payload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// 已完成任务的保留期（秒）
    pub retention_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:fedimark.db".to_string(),
                max_connections: 5,
            },
            api: ApiConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                cors_enabled: true,
            },
            import: ImportConfig {
                page_size: 40,
                http_timeout_seconds: 30,
            },
            cache: CacheConfig {
                capacity: 5,
                ttl_seconds: 300,
                min_payload_bytes: 1024 * 1024,
            },
            jobs: JobsConfig {
                retention_seconds: 3600,
            },
            log: LogConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = [
                "config/fedimark.toml",
                "fedimark.toml",
                "/etc/fedimark/config.toml",
            ];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        let defaults = AppConfig::default();
        builder = builder
            .set_default("database.url", defaults.database.url.clone())?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default("api.bind_address", defaults.api.bind_address.clone())?
            .set_default("api.cors_enabled", defaults.api.cors_enabled)?
            .set_default("import.page_size", defaults.import.page_size)?
            .set_default(
                "import.http_timeout_seconds",
                defaults.import.http_timeout_seconds,
            )?
            .set_default("cache.capacity", defaults.cache.capacity as u64)?
            .set_default("cache.ttl_seconds", defaults.cache.ttl_seconds)?
            .set_default(
                "cache.min_payload_bytes",
                defaults.cache.min_payload_bytes as u64,
            )?
            .set_default("jobs.retention_seconds", defaults.jobs.retention_seconds)?
            .set_default("log.level", defaults.log.level.clone())?;

        builder = builder.add_source(
            Environment::with_prefix("FEDIMARK")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.database.url, "database.url")?;
        ValidationUtils::validate_count(self.database.max_connections as usize, "database.max_connections")?;
        ValidationUtils::validate_not_empty(&self.api.bind_address, "api.bind_address")?;
        ValidationUtils::validate_range(u64::from(self.import.page_size), 1, 100, "import.page_size")?;
        ValidationUtils::validate_count(self.cache.capacity, "cache.capacity")?;
        ValidationUtils::validate_count(self.cache.ttl_seconds as usize, "cache.ttl_seconds")?;
        if self.jobs.retention_seconds <= 0 {
            return Err(crate::ConfigError::Validation(
                "jobs.retention_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
