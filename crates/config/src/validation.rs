//! 配置校验工具

use crate::{ConfigError, ConfigResult};

pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

pub struct ValidationUtils;

impl ValidationUtils {
    pub fn validate_not_empty(value: &str, field: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{field} must not be empty")));
        }
        Ok(())
    }

    pub fn validate_count(value: usize, field: &str) -> ConfigResult<()> {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{field} must be greater than zero"
            )));
        }
        Ok(())
    }

    pub fn validate_range(value: u64, min: u64, max: u64, field: &str) -> ConfigResult<()> {
        if value < min || value > max {
            return Err(ConfigError::Validation(format!(
                "{field} must be within [{min}, {max}], got {value}"
            )));
        }
        Ok(())
    }
}
