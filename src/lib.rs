pub mod epub;

// === 核心API重新导出 ===

/// EPUB读取器（主要接口）
pub use epub::Epub;

/// 错误处理
pub use epub::{EpubError, Result};

// === 包文档模型 ===

/// 包文档及其组成部分
pub use epub::{
    PackageDocument,
    Metadata,
    Creator,
    Identifier,
    Manifest,
    ManifestItem,
    Spine,
    SpineItem,
    GuideReference,
};

/// 解析选项与诊断信息
pub use epub::{ParseOptions, SingleValuePolicy, Diagnostic, DiagnosticKind, Diagnostics};

/// 扩展字段
pub use epub::{Book, DerivedField, PackageContext, StandardFields};

// === 底层组件（高级用法） ===

/// 元素树与命名空间
pub use epub::{Element, Namespace};

/// 容器与资源来源
pub use epub::{Container, RootFile, ResourceSource, ZipSource, DirSource, MemorySource};

// === 库信息 ===

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库的描述
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

// === 便捷函数 ===

/// 快速打开EPUB文件
///
/// 这是 `Epub::open` 的便捷包装函数。
///
/// # 参数
/// * `path` - EPUB文件路径
///
/// # 返回值
/// * `Result<Epub>` - EPUB实例
///
/// # 示例
///
/// ```no_run
/// let mut epub = bookbinder::open("book.epub")?;
/// let book = epub.load_book()?;
/// println!("书名: {}", book.document().title().unwrap_or("未知标题"));
/// # Ok::<(), bookbinder::EpubError>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Epub> {
    Epub::open(path)
}

/// 直接解析OPF文件内容
///
/// 只有XML本身无法解析时才返回错误。
///
/// ```rust
/// let book = bookbinder::parse_package(
///     r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/">
///          <metadata><dc:title>Alice</dc:title></metadata>
///        </package>"#,
/// )?;
/// assert_eq!(book.document().title(), Some("Alice"));
/// assert!(book.document().manifest().is_none());
/// # Ok::<(), bookbinder::EpubError>(())
/// ```
pub fn parse_package(xml_content: &str) -> Result<Book> {
    Book::parse_xml(xml_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_description() {
        assert!(!DESCRIPTION.is_empty());
    }

    #[test]
    fn test_parse_package_reports_missing_manifest() {
        let book = parse_package(r#"<package xmlns="http://www.idpf.org/2007/opf"><metadata/></package>"#)
            .expect("解析OPF失败");
        assert_eq!(
            book.diagnostics().of_kind(DiagnosticKind::StructuralAbsence).count(),
            1
        );
    }
}
