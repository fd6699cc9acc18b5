//! 扩展模块
//!
//! 调用方可以在不修改核心模型的前提下，为一本书定义额外的派生字段。
//! 派生字段是包文档（以及原始元素树）的纯函数，首次访问时计算，之后缓存。
//!
//! ```rust
//! use bookbinder::epub::opf::{Book, DerivedField, PackageContext};
//!
//! struct Authors {
//!     first: DerivedField<Option<String>>,
//! }
//!
//! impl Default for Authors {
//!     fn default() -> Self {
//!         Self {
//!             first: DerivedField::new("first_author", |ctx: &PackageContext<'_>| {
//!                 ctx.document()
//!                     .metadata()
//!                     .and_then(|m| m.creator_names().first().map(|s| s.to_string()))
//!             }),
//!         }
//!     }
//! }
//!
//! let opf = r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/">
//!   <metadata><dc:creator>Lewis Carroll</dc:creator></metadata></package>"#;
//! let book: Book<Authors> = Book::parse_xml(opf)?.extend();
//! assert_eq!(book.derive(|e| &e.first).as_deref(), Some("Lewis Carroll"));
//! # Ok::<(), bookbinder::EpubError>(())
//! ```

use crate::epub::error::Result;
use crate::epub::opf::config::ParseOptions;
use crate::epub::opf::diagnostics::Diagnostics;
use crate::epub::opf::guide::GuideReference;
use crate::epub::opf::manifest::ManifestItem;
use crate::epub::opf::package::PackageDocument;
use crate::epub::xml::Element;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// 派生字段计算时可见的上下文：已构建的包文档与原始元素树
#[derive(Debug, Clone, Copy)]
pub struct PackageContext<'a> {
    document: &'a PackageDocument,
    root: &'a Element,
}

impl<'a> PackageContext<'a> {
    pub fn document(&self) -> &'a PackageDocument {
        self.document
    }

    /// 原始 `<package>` 元素
    pub fn root(&self) -> &'a Element {
        self.root
    }

    /// 在原始元素树上执行带命名空间的路径查询，见 [`Element::select`]
    pub fn select(&self, path: &str) -> Vec<&'a Element> {
        self.root.select(path)
    }
}

/// 惰性计算的派生字段
pub struct DerivedField<T> {
    name: &'static str,
    compute: fn(&PackageContext<'_>) -> T,
    cell: OnceCell<T>,
}

impl<T> DerivedField<T> {
    pub const fn new(name: &'static str, compute: fn(&PackageContext<'_>) -> T) -> Self {
        Self {
            name,
            compute,
            cell: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 获取字段值，首次调用时计算
    pub fn get(&self, ctx: &PackageContext<'_>) -> &T {
        self.cell.get_or_init(|| (self.compute)(ctx))
    }

    /// 是否已经计算过
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for DerivedField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedField")
            .field("name", &self.name)
            .field("value", &self.cell.get())
            .finish()
    }
}

/// 一本已解析的书
///
/// 拥有包文档，并与派生字段共享原始元素树的所有权，
/// 因此派生字段在书的整个生命周期内都可以重新查询元素树。
/// `E` 是调用方定义的扩展，通常由若干 [`DerivedField`] 组成。
#[derive(Debug)]
pub struct Book<E = ()> {
    document: PackageDocument,
    root: Arc<Element>,
    diagnostics: Diagnostics,
    extension: E,
}

impl Book<()> {
    /// 解析OPF文件内容（默认选项）
    pub fn parse_xml(xml_content: &str) -> Result<Book> {
        Self::parse_xml_with(xml_content, &ParseOptions::default())
    }

    /// 使用指定选项解析OPF文件内容
    pub fn parse_xml_with(xml_content: &str, options: &ParseOptions) -> Result<Book> {
        let root = Element::parse(xml_content)?;
        Ok(Self::from_root(Arc::new(root), options))
    }

    /// 从已解析的元素树构建
    pub fn from_root(root: Arc<Element>, options: &ParseOptions) -> Book {
        let (document, diagnostics) = PackageDocument::build_with(&root, options);
        Book {
            document,
            root,
            diagnostics,
            extension: (),
        }
    }
}

impl<E> Book<E> {
    /// 换用另一种扩展，已计算的派生字段不会保留
    pub fn extend<F: Default>(self) -> Book<F> {
        Book {
            document: self.document,
            root: self.root,
            diagnostics: self.diagnostics,
            extension: F::default(),
        }
    }

    pub fn document(&self) -> &PackageDocument {
        &self.document
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// 共享原始元素树
    pub fn shared_root(&self) -> Arc<Element> {
        Arc::clone(&self.root)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }

    pub fn context(&self) -> PackageContext<'_> {
        PackageContext {
            document: &self.document,
            root: &self.root,
        }
    }

    /// 计算（或读取已缓存的）派生字段
    pub fn derive<'a, T>(&'a self, field: impl FnOnce(&'a E) -> &'a DerivedField<T>) -> &'a T {
        field(&self.extension).get(&self.context())
    }

    /// 拆分为包文档和诊断信息，释放元素树
    pub fn into_parts(self) -> (PackageDocument, Diagnostics) {
        (self.document, self.diagnostics)
    }
}

/// 常用派生字段
#[derive(Debug)]
pub struct StandardFields {
    /// 第一个创建者
    pub first_creator: DerivedField<Option<String>>,
    /// 封面图片清单项
    pub cover_item: DerivedField<Option<ManifestItem>>,
    /// 目录参考点，直接查询元素树中的 `opf:guide/opf:reference`
    pub toc_reference: DerivedField<Option<GuideReference>>,
}

impl Default for StandardFields {
    fn default() -> Self {
        Self {
            first_creator: DerivedField::new("first_creator", |ctx| {
                ctx.document()
                    .metadata()?
                    .creators()
                    .first()
                    .map(|c| c.name.clone())
            }),
            cover_item: DerivedField::new("cover_item", |ctx| ctx.document().cover_item().cloned()),
            toc_reference: DerivedField::new("toc_reference", |ctx| {
                ctx.select("opf:guide/opf:reference")
                    .into_iter()
                    .find(|r| r.attr("type") == Some("toc"))
                    .map(GuideReference::from_element)
            }),
        }
    }
}

impl Book<StandardFields> {
    pub fn first_creator(&self) -> Option<&str> {
        self.derive(|e| &e.first_creator).as_deref()
    }

    pub fn cover_item(&self) -> Option<&ManifestItem> {
        self.derive(|e| &e.cover_item).as_ref()
    }

    pub fn toc_reference(&self) -> Option<&GuideReference> {
        self.derive(|e| &e.toc_reference).as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/" version="2.0">
  <metadata>
    <dc:title>Alice</dc:title>
    <dc:creator>Lewis Carroll</dc:creator>
    <dc:creator>John Tenniel</dc:creator>
    <dc:contributor>Editor</dc:contributor>
    <meta name="cover" content="img"/>
  </metadata>
  <manifest><item id="img" href="cover.jpg" media-type="image/jpeg"/></manifest>
  <guide>
    <reference type="cover" title="Cover" href="cover.xhtml"/>
    <reference type="toc" title="Contents" href="toc.xhtml"/>
  </guide>
</package>"#;

    #[derive(Debug)]
    struct Counting {
        creator_count: DerivedField<usize>,
        secondary_authors: DerivedField<Vec<String>>,
    }

    impl Default for Counting {
        fn default() -> Self {
            Self {
                creator_count: DerivedField::new("creator_count", |ctx| {
                    ctx.document().metadata().map_or(0, |m| m.creators().len())
                }),
                secondary_authors: DerivedField::new("secondary_authors", |ctx| {
                    ctx.document()
                        .metadata()
                        .map(|m| m.contributor_names().into_iter().map(String::from).collect::<Vec<_>>())
                        .unwrap_or_default()
                }),
            }
        }
    }

    #[test]
    fn test_standard_fields() {
        let book: Book<StandardFields> = Book::parse_xml(OPF).expect("解析OPF失败").extend();
        assert_eq!(book.first_creator(), Some("Lewis Carroll"));
        assert_eq!(book.cover_item().map(|i| i.href.as_str()), Some("cover.jpg"));
        assert_eq!(book.toc_reference().map(|r| r.title.as_str()), Some("Contents"));
        assert_eq!(book.document().title(), Some("Alice"));
    }

    #[test]
    fn test_fields_are_lazy_and_cached() {
        let book: Book<Counting> = Book::parse_xml(OPF).expect("解析OPF失败").extend();
        assert!(!book.extension().creator_count.is_computed());

        let first = book.derive(|e| &e.creator_count);
        assert_eq!(*first, 2);
        assert!(book.extension().creator_count.is_computed());
        assert!(!book.extension().secondary_authors.is_computed());

        let again = book.derive(|e| &e.creator_count);
        assert!(std::ptr::eq(first, again));
        assert_eq!(book.derive(|e| &e.secondary_authors), &vec!["Editor".to_string()]);
        assert_eq!(book.extension().creator_count.name(), "creator_count");
    }

    #[test]
    fn test_root_outlives_parse() {
        let book = Book::parse_xml(OPF).expect("解析OPF失败");
        let root = book.shared_root();
        let (document, diagnostics) = book.into_parts();
        assert!(diagnostics.is_empty());
        assert_eq!(root.select("opf:guide/opf:reference").len(), 2);
        assert_eq!(document.guide().len(), 2);
    }

    #[test]
    fn test_book_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Book<StandardFields>>();
        assert_send_sync::<PackageDocument>();
    }
}
