//! 元数据处理模块
//!
//! 提供 `<metadata>` 中Dublin Core元素与 `<meta>` 元素的提取和汇总。

use crate::epub::namespace::Namespace;
use crate::epub::opf::diagnostics::{DiagnosticKind, ParseContext};
use crate::epub::xml::Element;
use serde::Serialize;

/// Dublin Core元素（DCMES 1.1）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DcElement {
    Identifier,
    Title,
    Language,
    Contributor,
    Coverage,
    Creator,
    Date,
    Description,
    Format,
    Publisher,
    Relation,
    Rights,
    Source,
    Subject,
    Type,
}

impl DcElement {
    fn from_local_name(name: &str) -> Option<Self> {
        let element = match name {
            "identifier" => DcElement::Identifier,
            "title" => DcElement::Title,
            "language" => DcElement::Language,
            "contributor" => DcElement::Contributor,
            "coverage" => DcElement::Coverage,
            "creator" => DcElement::Creator,
            "date" => DcElement::Date,
            "description" => DcElement::Description,
            "format" => DcElement::Format,
            "publisher" => DcElement::Publisher,
            "relation" => DcElement::Relation,
            "rights" => DcElement::Rights,
            "source" => DcElement::Source,
            "subject" => DcElement::Subject,
            "type" => DcElement::Type,
            _ => return None,
        };
        Some(element)
    }
}

/// 标识符信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    /// 标识符值（ISBN、UUID等）
    pub text: String,
    /// 元素ID，供 `unique-identifier` 引用
    pub id: Option<String>,
    /// 标识符类型（`opf:scheme`）
    pub scheme: Option<String>,
}

impl Identifier {
    /// 从 `<dc:identifier>` 元素提取标识符，没有文本时值为空字符串
    pub fn from_element(element: &Element, ctx: &ParseContext<'_>) -> Self {
        Self {
            text: ctx.text_of(element).unwrap_or_default(),
            id: element.attr("id").map(str::to_string),
            scheme: opf_attr(element, "scheme"),
        }
    }
}

/// 创建者或贡献者信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Creator {
    /// 元素文本
    pub name: String,
    /// 角色（`opf:role`，如aut、edt）
    pub role: Option<String>,
    /// 排序用名称（`opf:file-as`）
    pub file_as: Option<String>,
    /// 元素ID
    pub id: Option<String>,
}

impl Creator {
    /// 从 `<dc:creator>` 或 `<dc:contributor>` 元素提取，没有文本时返回None
    pub fn from_element(element: &Element, ctx: &ParseContext<'_>) -> Option<Self> {
        ctx.text_of(element).map(|name| Self::extract(element, name))
    }

    fn extract(element: &Element, name: String) -> Self {
        Self {
            name,
            role: opf_attr(element, "role"),
            file_as: opf_attr(element, "file-as"),
            id: element.attr("id").map(str::to_string),
        }
    }
}

/// 读取OPF命名空间下的属性，兼容省略前缀的写法
fn opf_attr(element: &Element, local_name: &str) -> Option<String> {
    element
        .attr_ns(Namespace::Opf, local_name)
        .or_else(|| element.attr(local_name))
        .map(str::to_string)
}

/// `<meta>` 元素的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaEntry {
    /// `property="dcterms:modified"`，值为元素文本
    Modified(Option<String>),
    /// `name="cover"`，值为content属性
    CoverImage(Option<String>),
    /// 其他meta，忽略
    Unrecognized,
}

impl MetaEntry {
    /// 按属性模式对 `<meta>` 元素分类
    pub fn classify(element: &Element, ctx: &ParseContext<'_>) -> Self {
        let options = ctx.options();
        if element.attr("property") == Some(options.modified_property.as_str()) {
            MetaEntry::Modified(ctx.text_of(element))
        } else if element.attr("name") == Some(options.cover_meta_name.as_str()) {
            MetaEntry::CoverImage(element.attr("content").map(str::to_string))
        } else {
            MetaEntry::Unrecognized
        }
    }
}

/// OPF文件中的元数据信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    identifiers: Vec<Identifier>,
    titles: Vec<String>,
    languages: Vec<String>,
    contributors: Vec<Creator>,
    creators: Vec<Creator>,
    date: Option<String>,
    description: Option<String>,
    publisher: Option<String>,
    rights: Option<String>,
    sources: Vec<String>,
    subjects: Vec<String>,
    modified_date: Option<String>,
    cover_image_id: Option<String>,
}

impl Metadata {
    /// 从package元素构建元数据
    ///
    /// # 参数
    /// * `package` - `<package>` 根元素
    /// * `ctx` - 解析上下文
    ///
    /// # 返回值
    /// * `Option<Metadata>` - 缺少 `<metadata>` 元素时返回None
    pub fn build(package: &Element, ctx: &mut ParseContext<'_>) -> Option<Metadata> {
        let Some(metadata) = package.child(Namespace::Opf, "metadata") else {
            ctx.record(
                DiagnosticKind::StructuralAbsence,
                "opf:metadata",
                "package中缺少metadata元素",
            );
            return None;
        };

        let built = flatten_legacy(metadata, |e| Namespace::Dc.matches(e.namespace()))
            .into_iter()
            .fold(Metadata::default(), |acc, element| {
                acc.with_dublin_core(element, ctx)
            });

        let built = flatten_legacy(metadata, |e| e.is(Namespace::Opf, "meta"))
            .into_iter()
            .fold(built, |acc, element| acc.with_meta(element, ctx));

        Some(built)
    }

    fn with_dublin_core(mut self, element: &Element, ctx: &mut ParseContext<'_>) -> Self {
        let Some(kind) = DcElement::from_local_name(element.local_name()) else {
            ctx.record(
                DiagnosticKind::UnrecognizedElement,
                format!("dc:{}", element.local_name()),
                "不属于DCMES的元素，已忽略",
            );
            return self;
        };
        // 标识符的数量与元素数量一致，没有文本时取空字符串
        if kind == DcElement::Identifier {
            self.identifiers.push(Identifier::from_element(element, ctx));
            return self;
        }
        let Some(text) = ctx.text_of(element) else {
            ctx.record(
                DiagnosticKind::ElementMalformed,
                format!("dc:{}", element.local_name()),
                "元素没有文本内容，已跳过",
            );
            return self;
        };

        let policy = ctx.options().single_value;
        match kind {
            DcElement::Identifier => {}
            DcElement::Title => self.titles.push(text),
            DcElement::Language => self.languages.push(text),
            DcElement::Contributor => self.contributors.push(Creator::extract(element, text)),
            DcElement::Creator => self.creators.push(Creator::extract(element, text)),
            DcElement::Date => policy.assign(&mut self.date, text),
            DcElement::Description => policy.assign(&mut self.description, text),
            DcElement::Publisher => policy.assign(&mut self.publisher, text),
            DcElement::Rights => policy.assign(&mut self.rights, text),
            DcElement::Source => self.sources.push(text),
            DcElement::Subject => self.subjects.push(text),
            DcElement::Coverage | DcElement::Format | DcElement::Relation | DcElement::Type => {}
        }
        self
    }

    fn with_meta(mut self, element: &Element, ctx: &mut ParseContext<'_>) -> Self {
        let policy = ctx.options().single_value;
        match MetaEntry::classify(element, ctx) {
            MetaEntry::Modified(Some(value)) => policy.assign(&mut self.modified_date, value),
            MetaEntry::CoverImage(Some(value)) => policy.assign(&mut self.cover_image_id, value),
            MetaEntry::Modified(None) | MetaEntry::CoverImage(None) => {
                ctx.record(DiagnosticKind::ElementMalformed, "opf:meta", "meta缺少取值");
            }
            MetaEntry::Unrecognized => {
                let pattern = element
                    .attr("property")
                    .or_else(|| element.attr("name"))
                    .unwrap_or_default();
                ctx.record(
                    DiagnosticKind::UnrecognizedElement,
                    "opf:meta",
                    format!("未处理的meta: {}", pattern),
                );
            }
        }
        self
    }

    /// 所有标识符，按文档顺序
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// 根据元素ID查找标识符
    pub fn identifier_by_id(&self, id: &str) -> Option<&Identifier> {
        self.identifiers.iter().find(|i| i.id.as_deref() == Some(id))
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// 第一个标题
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn contributors(&self) -> &[Creator] {
        &self.contributors
    }

    /// 贡献者名称列表
    pub fn contributor_names(&self) -> Vec<&str> {
        self.contributors.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn creators(&self) -> &[Creator] {
        &self.creators
    }

    /// 创建者名称列表
    pub fn creator_names(&self) -> Vec<&str> {
        self.creators.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn rights(&self) -> Option<&str> {
        self.rights.as_deref()
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// 最后修改时间（`dcterms:modified`）
    pub fn modified_date(&self) -> Option<&str> {
        self.modified_date.as_deref()
    }

    /// 封面图片的清单项ID（`<meta name="cover">`）
    pub fn cover_image_id(&self) -> Option<&str> {
        self.cover_image_id.as_deref()
    }
}

/// 按文档顺序收集满足条件的子元素
///
/// OPF 2.0 旧式的 `dc-metadata` / `x-metadata` 包装元素会被展开。
fn flatten_legacy<'a>(metadata: &'a Element, pick: impl Fn(&Element) -> bool) -> Vec<&'a Element> {
    let mut out = Vec::new();
    for child in metadata.children() {
        if child.is(Namespace::Opf, "dc-metadata") || child.is(Namespace::Opf, "x-metadata") {
            out.extend(child.children().filter(|c| pick(*c)));
        } else if pick(child) {
            out.push(child);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::opf::config::{ParseOptions, SingleValuePolicy};

    fn build(xml: &str, options: &ParseOptions) -> Option<Metadata> {
        let root = Element::parse(xml).expect("解析XML失败");
        let mut ctx = ParseContext::new(options);
        Metadata::build(&root, &mut ctx)
    }

    fn package(metadata_body: &str) -> String {
        format!(
            r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf" version="2.0"><metadata>{}</metadata></package>"#,
            metadata_body
        )
    }

    #[test]
    fn test_identifiers_in_document_order() {
        let xml = package(
            r#"<dc:identifier id="uid" opf:scheme="ISBN">978-0-00-000000-0</dc:identifier>
               <dc:title>T</dc:title>
               <dc:identifier>urn:uuid:1234</dc:identifier>
               <dc:identifier scheme="DOI">10.1000/1</dc:identifier>"#,
        );
        let metadata = build(&xml, &ParseOptions::default()).expect("缺少metadata");
        let ids = metadata.identifiers();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0].text, "978-0-00-000000-0");
        assert_eq!(ids[0].id.as_deref(), Some("uid"));
        assert_eq!(ids[0].scheme.as_deref(), Some("ISBN"));
        assert_eq!(ids[1].text, "urn:uuid:1234");
        assert_eq!(ids[1].id, None);
        assert_eq!(ids[2].scheme.as_deref(), Some("DOI"));
        assert_eq!(metadata.identifier_by_id("uid").map(|i| i.text.as_str()), Some("978-0-00-000000-0"));
    }

    #[test]
    fn test_multi_and_single_valued_fields() {
        let xml = package(
            r#"<dc:title>Alice</dc:title>
               <dc:title>Through the Looking-Glass</dc:title>
               <dc:language>en</dc:language>
               <dc:creator opf:role="aut" opf:file-as="Carroll, Lewis">Lewis Carroll</dc:creator>
               <dc:contributor opf:role="ill">John Tenniel</dc:contributor>
               <dc:publisher>Macmillan</dc:publisher>
               <dc:publisher>Project Gutenberg</dc:publisher>
               <dc:date>1865</dc:date>
               <dc:rights>Public domain</dc:rights>
               <dc:description>A girl falls down a rabbit hole.</dc:description>
               <dc:source>gutenberg.org</dc:source>
               <dc:subject>Fantasy</dc:subject>
               <dc:subject>Children</dc:subject>
               <dc:format>application/epub+zip</dc:format>
               <dc:type>Text</dc:type>"#,
        );
        let metadata = build(&xml, &ParseOptions::default()).expect("缺少metadata");
        assert_eq!(metadata.titles(), ["Alice", "Through the Looking-Glass"]);
        assert_eq!(metadata.title(), Some("Alice"));
        assert_eq!(metadata.languages(), ["en"]);
        assert_eq!(metadata.creator_names(), vec!["Lewis Carroll"]);
        assert_eq!(metadata.creators()[0].role.as_deref(), Some("aut"));
        assert_eq!(metadata.creators()[0].file_as.as_deref(), Some("Carroll, Lewis"));
        assert_eq!(metadata.contributor_names(), vec!["John Tenniel"]);
        assert_eq!(metadata.publisher(), Some("Project Gutenberg"));
        assert_eq!(metadata.date(), Some("1865"));
        assert_eq!(metadata.rights(), Some("Public domain"));
        assert_eq!(metadata.description(), Some("A girl falls down a rabbit hole."));
        assert_eq!(metadata.sources(), ["gutenberg.org"]);
        assert_eq!(metadata.subjects(), ["Fantasy", "Children"]);
    }

    #[test]
    fn test_first_wins_policy() {
        let xml = package(
            r#"<dc:publisher>First</dc:publisher><dc:publisher>Second</dc:publisher>
               <meta name="cover" content="a"/><meta name="cover" content="b"/>"#,
        );
        let options = ParseOptions {
            single_value: SingleValuePolicy::FirstWins,
            ..ParseOptions::default()
        };
        let metadata = build(&xml, &options).expect("缺少metadata");
        assert_eq!(metadata.publisher(), Some("First"));
        assert_eq!(metadata.cover_image_id(), Some("a"));
    }

    #[test]
    fn test_meta_classification() {
        let xml = package(
            r#"<meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>
               <meta name="cover" content="cover-img"/>
               <meta name="calibre:series" content="Alice"/>
               <meta property="belongs-to-collection">Wonderland</meta>"#,
        );
        let options = ParseOptions::default();
        let root = Element::parse(&xml).expect("解析XML失败");
        let mut ctx = ParseContext::new(&options);
        let metadata = Metadata::build(&root, &mut ctx).expect("缺少metadata");
        assert_eq!(metadata.modified_date(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(metadata.cover_image_id(), Some("cover-img"));

        let diagnostics = ctx.into_diagnostics();
        assert_eq!(diagnostics.of_kind(DiagnosticKind::UnrecognizedElement).count(), 2);
    }

    #[test]
    fn test_text_is_kept_exactly_by_default() {
        let xml = package(
            r#"<dc:title> Alice </dc:title>
               <meta property="dcterms:modified"> 2024-01-01T00:00:00Z </meta>"#,
        );
        let metadata = build(&xml, &ParseOptions::default()).expect("缺少metadata");
        assert_eq!(metadata.title(), Some(" Alice "));
        assert_eq!(metadata.modified_date(), Some(" 2024-01-01T00:00:00Z "));
    }

    #[test]
    fn test_meta_without_value_writes_nothing() {
        let xml = package(r#"<meta name="cover" content="c1"/><meta name="cover"/>"#);
        let metadata = build(&xml, &ParseOptions::default()).expect("缺少metadata");
        assert_eq!(metadata.cover_image_id(), Some("c1"));
    }

    #[test]
    fn test_empty_dc_elements_are_skipped() {
        let xml = package(r#"<dc:title></dc:title><dc:title>   </dc:title><dc:creator/><dc:identifier id="uid"/>"#);
        let metadata = build(&xml, &ParseOptions::default()).expect("缺少metadata");
        assert_eq!(metadata.titles(), ["   "]);

        let trimmed = ParseOptions {
            trim_text: true,
            ..ParseOptions::default()
        };
        let metadata = build(&xml, &trimmed).expect("缺少metadata");
        assert!(metadata.titles().is_empty());
        assert!(metadata.creators().is_empty());
        assert_eq!(metadata.identifiers().len(), 1);
        assert_eq!(metadata.identifiers()[0].text, "");
        assert_eq!(metadata.identifiers()[0].id.as_deref(), Some("uid"));
    }

    #[test]
    fn test_ignored_and_unknown_dc_elements() {
        let xml = package(
            r#"<dc:coverage>Victorian England</dc:coverage>
               <dc:relation>sequel</dc:relation>
               <dc:audience>children</dc:audience>"#,
        );
        let options = ParseOptions::default();
        let root = Element::parse(&xml).expect("解析XML失败");
        let mut ctx = ParseContext::new(&options);
        let metadata = Metadata::build(&root, &mut ctx).expect("缺少metadata");
        assert_eq!(metadata, Metadata::default());

        let diagnostics = ctx.into_diagnostics();
        let unknown: Vec<_> = diagnostics.of_kind(DiagnosticKind::UnrecognizedElement).collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].element, "dc:audience");
    }

    #[test]
    fn test_matches_namespace_not_prefix() {
        let xml = r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:x="http://purl.org/dc/elements/1.1/" xmlns:dc="urn:not-dublin-core">
            <metadata><x:title>Real</x:title><dc:title>Fake</dc:title></metadata></package>"#;
        let metadata = build(xml, &ParseOptions::default()).expect("缺少metadata");
        assert_eq!(metadata.titles(), ["Real"]);
    }

    #[test]
    fn test_legacy_dc_metadata_wrapper() {
        let xml = r#"<package xmlns="http://www.idpf.org/2007/opf">
            <metadata>
              <dc-metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
                <dc:title>Legacy</dc:title>
                <dc:identifier id="bookid">legacy-1</dc:identifier>
              </dc-metadata>
              <x-metadata><meta name="cover" content="cover"/></x-metadata>
            </metadata></package>"#;
        let metadata = build(xml, &ParseOptions::default()).expect("缺少metadata");
        assert_eq!(metadata.title(), Some("Legacy"));
        assert_eq!(metadata.identifiers().len(), 1);
        assert_eq!(metadata.cover_image_id(), Some("cover"));
    }

    #[test]
    fn test_missing_metadata_is_none() {
        let xml = r#"<package xmlns="http://www.idpf.org/2007/opf"><manifest/></package>"#;
        let options = ParseOptions::default();
        let root = Element::parse(xml).expect("解析XML失败");
        let mut ctx = ParseContext::new(&options);
        assert_eq!(Metadata::build(&root, &mut ctx), None);
        assert_eq!(
            ctx.into_diagnostics().of_kind(DiagnosticKind::StructuralAbsence).count(),
            1
        );
    }

    #[test]
    fn test_identifier_extractor_defaults_text() {
        let element = Element::parse(r#"<identifier id="x"/>"#).expect("解析XML失败");
        let options = ParseOptions::default();
        let ctx = ParseContext::new(&options);
        let identifier = Identifier::from_element(&element, &ctx);
        assert_eq!(identifier.text, "");
        assert_eq!(identifier.id.as_deref(), Some("x"));
        assert_eq!(Creator::from_element(&element, &ctx), None);
    }
}
