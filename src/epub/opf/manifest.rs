//! 清单模块
//!
//! 提供EPUB包中文件清单的结构定义和解析。

use crate::epub::namespace::Namespace;
use crate::epub::opf::diagnostics::{DiagnosticKind, ParseContext};
use crate::epub::xml::Element;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// 清单项必需的属性
const REQUIRED_ATTRIBUTES: [&str; 3] = ["id", "href", "media-type"];

/// 清单项信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestItem {
    /// 项目ID
    pub id: String,
    /// 文件路径(相对于OPF文件)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 属性(如nav、cover-image等)
    pub properties: Option<String>,
    /// 回退项ID
    pub fallback: Option<String>,
    /// 媒体叠加层项ID
    pub media_overlay: Option<String>,
}

impl ManifestItem {
    /// 从 `<item>` 元素提取清单项
    ///
    /// `id`、`href`、`media-type` 任一缺失时返回None。
    pub fn from_element(element: &Element) -> Option<Self> {
        Some(Self {
            id: element.attr("id")?.to_string(),
            href: element.attr("href")?.to_string(),
            media_type: element.attr("media-type")?.to_string(),
            properties: element.attr("properties").map(str::to_string),
            fallback: element.attr("fallback").map(str::to_string),
            media_overlay: element.attr("media-overlay").map(str::to_string),
        })
    }

    /// 检查是否包含指定属性
    pub fn has_property(&self, property: &str) -> bool {
        self.properties
            .as_deref()
            .is_some_and(|properties| properties.split_whitespace().any(|p| p == property))
    }

    /// 检查是否为导航文档
    pub fn is_nav(&self) -> bool {
        self.has_property("nav")
    }

    /// 检查是否为封面图片
    pub fn is_cover_image(&self) -> bool {
        self.has_property("cover-image")
    }

    /// 检查是否为图片文件
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// 检查是否为CSS文件
    pub fn is_css(&self) -> bool {
        self.media_type == "text/css"
    }

    /// 检查是否为XHTML文件
    pub fn is_xhtml(&self) -> bool {
        self.media_type == "application/xhtml+xml"
    }

    /// 检查是否为NCX文件
    pub fn is_ncx(&self) -> bool {
        self.media_type == "application/x-dtbncx+xml"
    }
}

/// 清单：资源ID到清单项的映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    #[serde(serialize_with = "serialize_sorted")]
    items: HashMap<String, ManifestItem>,
}

/// 按ID顺序输出，保证序列化结果稳定
fn serialize_sorted<S: Serializer>(
    items: &HashMap<String, ManifestItem>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    items.iter().collect::<BTreeMap<_, _>>().serialize(serializer)
}

impl Manifest {
    /// 从package元素构建清单
    ///
    /// # 参数
    /// * `package` - `<package>` 根元素
    /// * `ctx` - 解析上下文
    ///
    /// # 返回值
    /// * `Option<Manifest>` - 缺少 `<manifest>` 元素时返回None
    pub fn build(package: &Element, ctx: &mut ParseContext<'_>) -> Option<Manifest> {
        let Some(manifest) = package.child(Namespace::Opf, "manifest") else {
            ctx.record(
                DiagnosticKind::StructuralAbsence,
                "opf:manifest",
                "package中缺少manifest元素",
            );
            return None;
        };

        let mut items = HashMap::new();
        for element in manifest.children_named(Namespace::Opf, "item") {
            let Some(item) = ManifestItem::from_element(element) else {
                let missing: Vec<_> = REQUIRED_ATTRIBUTES
                    .iter()
                    .filter(|name| element.attr(name).is_none())
                    .copied()
                    .collect();
                ctx.record(
                    DiagnosticKind::ElementMalformed,
                    "opf:item",
                    format!("缺少属性 {}，已丢弃", missing.join(", ")),
                );
                continue;
            };

            if let Some(previous) = items.insert(item.id.clone(), item) {
                ctx.record(
                    DiagnosticKind::DuplicateId,
                    "opf:item",
                    format!("id '{}' 重复，替换了 {}", previous.id, previous.href),
                );
            }
        }

        Some(Manifest { items })
    }

    /// 根据ID获取清单项
    pub fn get(&self, id: &str) -> Option<&ManifestItem> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 全部清单项（无序）
    pub fn items(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.values()
    }

    /// 按ID排序的清单项，便于稳定输出
    pub fn sorted_items(&self) -> Vec<&ManifestItem> {
        let mut items: Vec<_> = self.items.values().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// 第一个（按ID排序）带有指定属性的清单项
    pub fn find_by_property(&self, property: &str) -> Option<&ManifestItem> {
        self.sorted_items()
            .into_iter()
            .find(|item| item.has_property(property))
    }

    /// 指定媒体类型的全部清单项
    pub fn by_media_type<'a>(&'a self, media_type: &'a str) -> impl Iterator<Item = &'a ManifestItem> + 'a {
        self.items.values().filter(move |item| item.media_type == media_type)
    }

    /// 所有图片文件路径
    pub fn image_paths(&self) -> Vec<&str> {
        self.items
            .values()
            .filter(|item| item.is_image())
            .map(|item| item.href.as_str())
            .collect()
    }
}
