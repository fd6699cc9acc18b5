//! 包文档模块
//!
//! 将元数据、清单、脊柱和指南组合为一本书的包文档模型。

use crate::epub::error::{EpubError, Result};
use crate::epub::namespace::Namespace;
use crate::epub::opf::config::ParseOptions;
use crate::epub::opf::diagnostics::{DiagnosticKind, Diagnostics, ParseContext};
use crate::epub::opf::guide::{self, GuideReference};
use crate::epub::opf::manifest::{Manifest, ManifestItem};
use crate::epub::opf::metadata::{Identifier, Metadata};
use crate::epub::opf::spine::Spine;
use crate::epub::xml::Element;
use serde::Serialize;

/// OPF包文档解析结果
///
/// 构建后不可变。缺失的 `<metadata>` 或 `<manifest>` 表示为None，
/// 由调用方决定是否视为致命问题。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageDocument {
    version: Option<String>,
    unique_identifier: Option<String>,
    metadata: Option<Metadata>,
    manifest: Option<Manifest>,
    spine: Option<Spine>,
    guide: Vec<GuideReference>,
}

impl PackageDocument {
    /// 使用默认选项从 `<package>` 元素构建包文档
    pub fn build(package: &Element) -> PackageDocument {
        Self::build_with(package, &ParseOptions::default()).0
    }

    /// 使用指定选项构建包文档，并返回解析过程中的诊断信息
    ///
    /// # 参数
    /// * `package` - `<package>` 根元素
    /// * `options` - 解析选项
    ///
    /// # 返回值
    /// * `(PackageDocument, Diagnostics)` - 包文档和诊断信息，不会失败
    pub fn build_with(package: &Element, options: &ParseOptions) -> (PackageDocument, Diagnostics) {
        let mut ctx = ParseContext::new(options);

        if !package.is(Namespace::Opf, "package") {
            ctx.record(
                DiagnosticKind::UnrecognizedElement,
                package.local_name(),
                "根元素不是opf:package，继续按包文档解析",
            );
        }

        let document = PackageDocument {
            version: package.attr("version").map(str::to_string),
            unique_identifier: package.attr("unique-identifier").map(str::to_string),
            metadata: Metadata::build(package, &mut ctx),
            manifest: Manifest::build(package, &mut ctx),
            spine: Spine::build(package, &mut ctx),
            guide: guide::build(package, &mut ctx),
        };

        (document, ctx.into_diagnostics())
    }

    /// 解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    ///
    /// # 返回值
    /// * `Result<PackageDocument>` - 只有XML本身无法解析时才返回错误
    pub fn parse_xml(xml_content: &str) -> Result<PackageDocument> {
        let root = Element::parse(xml_content)?;
        Ok(Self::build(&root))
    }

    /// 序列化为YAML文本
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(|e| EpubError::Serialization(e.to_string()))
    }

    /// 包文档版本（package的version属性）
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn spine(&self) -> Option<&Spine> {
        self.spine.as_ref()
    }

    /// 指南参考点，按文档顺序
    pub fn guide(&self) -> &[GuideReference] {
        &self.guide
    }

    /// package的unique-identifier属性（标识符元素的ID）
    pub fn unique_identifier_ref(&self) -> Option<&str> {
        self.unique_identifier.as_deref()
    }

    /// unique-identifier所指向的标识符
    pub fn unique_identifier(&self) -> Option<&Identifier> {
        let id = self.unique_identifier.as_deref()?;
        self.metadata.as_ref()?.identifier_by_id(id)
    }

    /// 第一个标题
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref()?.title()
    }

    /// 根据ID获取清单项
    pub fn manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.as_ref()?.get(id)
    }

    /// 封面图片清单项
    ///
    /// 优先使用 `<meta name="cover">` 指向的清单项，
    /// 其次使用带有 `cover-image` 属性的清单项。
    pub fn cover_item(&self) -> Option<&ManifestItem> {
        let manifest = self.manifest.as_ref()?;
        self.metadata
            .as_ref()
            .and_then(Metadata::cover_image_id)
            .and_then(|id| manifest.get(id))
            .or_else(|| manifest.find_by_property("cover-image"))
    }

    /// 导航文档清单项（EPUB 3）
    pub fn nav_item(&self) -> Option<&ManifestItem> {
        self.manifest.as_ref()?.find_by_property("nav")
    }

    /// 第一个指定类型的指南参考点
    pub fn guide_reference(&self, ref_type: &str) -> Option<&GuideReference> {
        self.guide.iter().find(|r| r.ref_type == ref_type)
    }

    /// 按脊柱顺序排列的线性清单项，无法解析的idref被跳过
    pub fn linear_items(&self) -> Vec<&ManifestItem> {
        let (Some(spine), Some(manifest)) = (&self.spine, &self.manifest) else {
            return Vec::new();
        };
        spine
            .linear_items()
            .filter_map(|item| manifest.get(&item.idref))
            .collect()
    }
}
