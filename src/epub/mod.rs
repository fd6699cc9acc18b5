pub mod error;
pub mod namespace;
pub mod xml;
pub mod container;
pub mod source;
pub mod reader;
pub mod opf;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出命名空间与元素树
pub use namespace::Namespace;
pub use xml::{Attribute, Element, XmlNode};

// 重新导出容器和资源来源
pub use container::{Container, RootFile};
pub use source::{DirSource, MemorySource, ResourceSource, ZipSource};

// 重新导出EPUB读取器
pub use reader::{Epub, resolve_href};

// 重新导出OPF相关
pub use opf::{
    Book,
    Creator,
    DerivedField,
    Diagnostic,
    DiagnosticKind,
    Diagnostics,
    GuideReference,
    Identifier,
    Manifest,
    ManifestItem,
    Metadata,
    PackageContext,
    PackageDocument,
    ParseOptions,
    SingleValuePolicy,
    Spine,
    SpineItem,
    StandardFields,
};
