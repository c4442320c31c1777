//! 请求参数校验
//!
//! 把外部输入转换为领域类型，非法输入在进入应用层之前被拒绝。

use fedimark_common::constants::{IMPORT_SIZE_MAX, IMPORT_SIZE_MIN};
use fedimark_domain::value_objects::{ImportVisibility, Platform};

use crate::error::{ApiError, ApiResult};

pub fn require_non_empty(value: &str, field: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} 不能为空")));
    }
    Ok(())
}

pub fn parse_platform(value: &str) -> ApiResult<Platform> {
    Platform::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("platform 无效: {value}，可选 misskey/mastodon")))
}

pub fn parse_visibility(value: &str) -> ApiResult<ImportVisibility> {
    ImportVisibility::parse(value).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "visibility 无效: {value}，可选 public_only/followers/direct"
        ))
    })
}

pub fn validate_import_size(value: u64) -> ApiResult<u64> {
    if !(IMPORT_SIZE_MIN..=IMPORT_SIZE_MAX).contains(&value) {
        return Err(ApiError::BadRequest(format!(
            "import_size 必须在 [{IMPORT_SIZE_MIN}, {IMPORT_SIZE_MAX}] 范围内"
        )));
    }
    Ok(value)
}
