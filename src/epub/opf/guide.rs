//! 指南模块
//!
//! `<guide>` 中的导航参考点（封面、目录、正文起点等）。

use crate::epub::namespace::Namespace;
use crate::epub::opf::diagnostics::{DiagnosticKind, ParseContext};
use crate::epub::xml::Element;
use serde::Serialize;

/// 导航参考点
///
/// 缺失的属性取空字符串。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuideReference {
    pub title: String,
    pub href: String,
    /// 参考点类型，如 `cover`、`toc`、`text`
    #[serde(rename = "type")]
    pub ref_type: String,
}

impl GuideReference {
    /// 从 `<reference>` 元素提取
    pub fn from_element(element: &Element) -> Self {
        let attr = |name: &str| element.attr(name).unwrap_or_default().to_string();
        Self {
            title: attr("title"),
            href: attr("href"),
            ref_type: attr("type"),
        }
    }
}

/// 从package元素构建参考点列表，保持文档顺序
///
/// 没有 `<guide>` 时返回空列表。`<reference>` 以外的子元素被忽略并记录。
pub fn build(package: &Element, ctx: &mut ParseContext<'_>) -> Vec<GuideReference> {
    let Some(guide) = package.child(Namespace::Opf, "guide") else {
        return Vec::new();
    };

    let mut references = Vec::new();
    for element in guide.children() {
        if element.is(Namespace::Opf, "reference") {
            references.push(GuideReference::from_element(element));
        } else {
            ctx.record(
                DiagnosticKind::UnrecognizedElement,
                element.local_name(),
                "guide中只识别reference元素，已忽略",
            );
        }
    }
    references
}
