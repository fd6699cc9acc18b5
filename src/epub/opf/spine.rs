//! 脊柱模块
//!
//! 提供EPUB包中阅读顺序（脊柱）的结构定义和解析。

use crate::epub::namespace::Namespace;
use crate::epub::opf::diagnostics::{DiagnosticKind, ParseContext};
use crate::epub::xml::Element;
use serde::Serialize;

/// 脊柱项信息(阅读顺序)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpineItem {
    /// 引用的清单项ID
    pub idref: String,
    /// 是否线性阅读
    pub linear: bool,
    pub id: Option<String>,
    pub properties: Option<String>,
}

impl SpineItem {
    /// 从 `<itemref>` 元素提取，缺少idref时返回None
    pub fn from_element(element: &Element) -> Option<Self> {
        Some(Self {
            idref: element.attr("idref")?.to_string(),
            linear: element.attr("linear") != Some("no"),
            id: element.attr("id").map(str::to_string),
            properties: element.attr("properties").map(str::to_string),
        })
    }

    /// 检查是否为线性阅读
    pub fn is_linear(&self) -> bool {
        self.linear
    }
}

/// 脊柱
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Spine {
    /// NCX清单项ID（EPUB 2）
    pub toc: Option<String>,
    /// 翻页方向（ltr、rtl、default）
    pub page_progression_direction: Option<String>,
    pub items: Vec<SpineItem>,
}

impl Spine {
    /// 从package元素构建脊柱，缺少 `<spine>` 时返回None
    pub fn build(package: &Element, ctx: &mut ParseContext<'_>) -> Option<Spine> {
        let spine = package.child(Namespace::Opf, "spine")?;

        let mut items = Vec::new();
        for element in spine.children_named(Namespace::Opf, "itemref") {
            match SpineItem::from_element(element) {
                Some(item) => items.push(item),
                None => ctx.record(
                    DiagnosticKind::ElementMalformed,
                    "opf:itemref",
                    "缺少idref属性，已丢弃",
                ),
            }
        }

        Some(Spine {
            toc: spine.attr("toc").map(str::to_string),
            page_progression_direction: spine
                .attr("page-progression-direction")
                .map(str::to_string),
            items,
        })
    }

    /// 线性阅读的脊柱项
    pub fn linear_items(&self) -> impl Iterator<Item = &SpineItem> {
        self.items.iter().filter(|item| item.is_linear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::opf::config::ParseOptions;

    #[test]
    fn test_spine_items_and_attributes() {
        let xml = r#"<package xmlns="http://www.idpf.org/2007/opf">
            <spine toc="ncx" page-progression-direction="rtl">
              <itemref idref="cover" linear="no"/>
              <itemref idref="c1"/>
              <itemref linear="yes"/>
              <itemref idref="c2" linear="yes" properties="page-spread-left"/>
            </spine></package>"#;
        let root = Element::parse(xml).expect("解析XML失败");
        let options = ParseOptions::default();
        let mut ctx = ParseContext::new(&options);
        let spine = Spine::build(&root, &mut ctx).expect("缺少spine");

        assert_eq!(spine.toc.as_deref(), Some("ncx"));
        assert_eq!(spine.page_progression_direction.as_deref(), Some("rtl"));
        assert_eq!(spine.items.len(), 3);
        assert!(!spine.items[0].is_linear());
        assert_eq!(spine.items[2].properties.as_deref(), Some("page-spread-left"));

        let linear: Vec<_> = spine.linear_items().map(|i| i.idref.as_str()).collect();
        assert_eq!(linear, vec!["c1", "c2"]);
        assert_eq!(ctx.into_diagnostics().len(), 1);
    }

    #[test]
    fn test_missing_spine_is_none() {
        let root = Element::parse(r#"<package xmlns="http://www.idpf.org/2007/opf"/>"#)
            .expect("解析XML失败");
        let options = ParseOptions::default();
        let mut ctx = ParseContext::new(&options);
        assert_eq!(Spine::build(&root, &mut ctx), None);
    }
}
