//! 领域值对象
//!
//! 平台类型、投稿可见性及导入过滤策略的定义

use serde::{Deserialize, Serialize};

/// 联邦宇宙平台类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Platform {
    #[serde(rename = "misskey")]
    Misskey,
    #[serde(rename = "mastodon")]
    Mastodon,
}

impl Platform {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "misskey" => Some(Platform::Misskey),
            "mastodon" => Some(Platform::Mastodon),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Misskey => "misskey",
            Platform::Mastodon => "mastodon",
        }
    }
}

/// 单条投稿的可见性分类
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Home,
    Unlisted,
    Followers,
    Specified,
    Direct,
}

impl Visibility {
    /// 解析平台返回的可见性字符串（Mastodon 的 private 等同于 followers）
    pub fn parse(s: &str) -> Self {
        match s {
            "public" => Visibility::Public,
            "home" => Visibility::Home,
            "unlisted" => Visibility::Unlisted,
            "followers" | "private" => Visibility::Followers,
            "specified" => Visibility::Specified,
            _ => Visibility::Direct,
        }
    }
}

/// 导入时的可见性过滤策略
///
/// 三档从窄到宽单调放宽：PublicOnly ⊆ Followers ⊆ Direct。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImportVisibility {
    #[serde(rename = "public_only")]
    PublicOnly,
    #[serde(rename = "followers")]
    Followers,
    /// 历史取名：实际含义是"包含全部投稿"
    #[serde(rename = "direct")]
    Direct,
}

impl ImportVisibility {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public_only" => Some(ImportVisibility::PublicOnly),
            "followers" => Some(ImportVisibility::Followers),
            "direct" => Some(ImportVisibility::Direct),
            _ => None,
        }
    }

    /// 纯谓词：该可见性的投稿是否计入导入
    pub fn admits(&self, visibility: Visibility) -> bool {
        match self {
            ImportVisibility::PublicOnly => matches!(
                visibility,
                Visibility::Public | Visibility::Home | Visibility::Unlisted
            ),
            ImportVisibility::Followers => {
                !matches!(visibility, Visibility::Specified | Visibility::Direct)
            }
            ImportVisibility::Direct => true,
        }
    }
}

impl Default for ImportVisibility {
    fn default() -> Self {
        ImportVisibility::PublicOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VISIBILITIES: [Visibility; 6] = [
        Visibility::Public,
        Visibility::Home,
        Visibility::Unlisted,
        Visibility::Followers,
        Visibility::Specified,
        Visibility::Direct,
    ];

    #[test]
    fn test_filter_is_monotonically_widening() {
        // public_only ⊆ followers ⊆ direct
        for v in ALL_VISIBILITIES {
            if ImportVisibility::PublicOnly.admits(v) {
                assert!(ImportVisibility::Followers.admits(v));
            }
            if ImportVisibility::Followers.admits(v) {
                assert!(ImportVisibility::Direct.admits(v));
            }
        }
    }

    #[test]
    fn test_public_only_filter() {
        let f = ImportVisibility::PublicOnly;
        assert!(f.admits(Visibility::Public));
        assert!(f.admits(Visibility::Home));
        assert!(f.admits(Visibility::Unlisted));
        assert!(!f.admits(Visibility::Followers));
        assert!(!f.admits(Visibility::Specified));
        assert!(!f.admits(Visibility::Direct));
    }

    #[test]
    fn test_followers_filter_excludes_only_direct_class() {
        let f = ImportVisibility::Followers;
        assert!(f.admits(Visibility::Followers));
        assert!(!f.admits(Visibility::Specified));
        assert!(!f.admits(Visibility::Direct));
    }

    #[test]
    fn test_direct_filter_admits_everything() {
        for v in ALL_VISIBILITIES {
            assert!(ImportVisibility::Direct.admits(v));
        }
    }

    #[test]
    fn test_visibility_parse_mastodon_aliases() {
        assert_eq!(Visibility::parse("private"), Visibility::Followers);
        assert_eq!(Visibility::parse("unlisted"), Visibility::Unlisted);
        assert_eq!(Visibility::parse("direct"), Visibility::Direct);
    }
}
