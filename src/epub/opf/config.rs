//! 解析选项模块
//!
//! 提供OPF解析行为的配置管理功能，支持从YAML文件加载配置。

use crate::epub::error::{EpubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 单值元数据字段（date、description、publisher、rights等）出现多次时的取值策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleValuePolicy {
    /// 文档顺序中最后一个元素生效
    #[default]
    LastWins,
    /// 文档顺序中第一个元素生效
    FirstWins,
}

impl SingleValuePolicy {
    /// 按策略写入单值字段
    pub fn assign(self, slot: &mut Option<String>, value: String) {
        match self {
            SingleValuePolicy::LastWins => *slot = Some(value),
            SingleValuePolicy::FirstWins => {
                if slot.is_none() {
                    *slot = Some(value);
                }
            }
        }
    }
}

/// OPF解析选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// 单值字段的取值策略
    pub single_value: SingleValuePolicy,
    /// 是否去除元素文本首尾的空白，默认保留原文
    pub trim_text: bool,
    /// 是否收集诊断信息
    pub collect_diagnostics: bool,
    /// 表示修改时间的meta property值
    pub modified_property: String,
    /// 表示封面图片的meta name值
    pub cover_meta_name: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            single_value: SingleValuePolicy::LastWins,
            trim_text: false,
            collect_diagnostics: true,
            modified_property: "dcterms:modified".to_string(),
            cover_meta_name: "cover".to_string(),
        }
    }
}

impl ParseOptions {
    /// 从YAML配置文件加载解析选项
    ///
    /// 文件中缺少的字段使用默认值。
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    /// * `Result<Self>` - 加载成功返回配置实例，失败返回错误
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| EpubError::ConfigError(format!("无法读取配置文件: {}", e)))?;

        Self::from_yaml(&content)
    }

    /// 从YAML文本解析选项
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 序列化为YAML文本
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self)
            .map_err(|e| EpubError::ConfigError(format!("序列化配置失败: {}", e)))
    }

    /// 将默认配置写入指定路径
    ///
    /// # 参数
    /// * `path` - 目标文件路径
    ///
    /// # 返回值
    /// * `Result<()>` - 写入成功返回Ok，失败返回错误
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = Self::default().to_yaml()?;

        let content_with_header = format!(
            "# OPF解析选项\n# single_value: last_wins | first_wins\n\n{}",
            yaml_content
        );

        fs::write(path.as_ref(), content_with_header)
            .map_err(|e| EpubError::ConfigError(format!("写入配置文件失败: {}", e)))
    }

    /// 尝试从配置文件加载，失败时回退到默认配置
    ///
    /// 未提供路径时直接使用默认配置。
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::from_path(path) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "配置文件无效，使用默认解析选项");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_assign() {
        let mut slot = None;
        SingleValuePolicy::LastWins.assign(&mut slot, "a".to_string());
        SingleValuePolicy::LastWins.assign(&mut slot, "b".to_string());
        assert_eq!(slot.as_deref(), Some("b"));

        let mut slot = None;
        SingleValuePolicy::FirstWins.assign(&mut slot, "a".to_string());
        SingleValuePolicy::FirstWins.assign(&mut slot, "b".to_string());
        assert_eq!(slot.as_deref(), Some("a"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let options = ParseOptions::from_yaml("single_value: first_wins\n").expect("解析配置失败");
        assert_eq!(options.single_value, SingleValuePolicy::FirstWins);
        assert!(!options.trim_text);
        assert_eq!(options.modified_property, "dcterms:modified");
        assert_eq!(options.cover_meta_name, "cover");
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = ParseOptions::from_yaml("single_value: sometimes\n").unwrap_err();
        assert!(matches!(err, EpubError::ConfigError(_)));
    }

    #[test]
    fn test_write_and_reload_default() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let path = dir.path().join("options.yaml");
        ParseOptions::write_default(&path).expect("写入配置失败");

        let loaded = ParseOptions::from_path(&path).expect("读取配置失败");
        assert_eq!(loaded, ParseOptions::default());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let missing = dir.path().join("missing.yaml");
        assert_eq!(ParseOptions::load_or_default(Some(&missing)), ParseOptions::default());
        assert_eq!(ParseOptions::load_or_default(None), ParseOptions::default());
    }
}
