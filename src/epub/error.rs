use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub相关的错误类型
///
/// 注意：OPF内容层面的缺失或格式问题不会成为错误，
/// 它们以诊断信息的形式记录（见 [`crate::epub::opf::Diagnostics`]）。
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("缺少mimetype文件")]
    MissingMimetype,

    #[error("无效的mimetype: {expected}, 找到: {found}")]
    InvalidMimetype { expected: String, found: String },

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("XML结构错误: {0}")]
    XmlStructure(String),

    #[error("资源不存在: {0}")]
    MissingResource(String),

    #[error("资源不是有效的UTF-8文本: {0}")]
    InvalidEncoding(String),

    #[error("container.xml解析错误: {0}")]
    ContainerParseError(String),

    #[error("OPF文件解析错误: {0}")]
    OpfParseError(String),

    #[error("配置文件错误: {0}")]
    ConfigError(String),

    #[error("序列化失败: {0}")]
    Serialization(String),
}
