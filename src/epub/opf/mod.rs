//! OPF（Open Packaging Format）文件解析模块
//! 
//! 此模块把 `<package>` 元素树解析为包文档模型：元数据、清单、脊柱和指南，
//! 并提供在包文档之上定义派生字段的扩展机制。

mod config;
mod diagnostics;
mod extension;
mod guide;
mod manifest;
mod metadata;
mod package;
mod spine;

pub use config::{ParseOptions, SingleValuePolicy};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, ParseContext};
pub use extension::{Book, DerivedField, PackageContext, StandardFields};
pub use guide::{build as build_guide, GuideReference};
pub use manifest::{Manifest, ManifestItem};
pub use metadata::{Creator, Identifier, MetaEntry, Metadata};
pub use package::PackageDocument;
pub use spine::{Spine, SpineItem};
