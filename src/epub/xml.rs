//! 命名空间感知的XML元素树
//!
//! 基于 `quick_xml::NsReader` 构建的只读元素树。元素和属性都携带解析后的
//! 命名空间URI，查询按URI而不是前缀匹配。树是完全拥有的值，
//! 可以放入 `Arc` 与解析结果共享。

use crate::epub::error::{EpubError, Result};
use crate::epub::namespace::{self, Namespace, XML_NS};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

/// 元素属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// 属性命名空间URI（无前缀属性为None）
    pub namespace: Option<String>,
    /// 本地名称
    pub local_name: String,
    /// 已反转义的属性值
    pub value: String,
}

/// 子节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
}

/// XML元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    prefix: Option<String>,
    local_name: String,
    attributes: Vec<Attribute>,
    nodes: Vec<XmlNode>,
}

impl Element {
    /// 解析XML文本并返回根元素
    ///
    /// # 参数
    /// * `xml_content` - XML文档内容
    ///
    /// # 返回值
    /// * `Result<Element>` - 文档根元素
    pub fn parse(xml_content: &str) -> Result<Element> {
        let mut reader = NsReader::from_str(xml_content);
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    let element = Self::open(&reader, e)?;
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let element = Self::open(&reader, e)?;
                    Self::attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        Self::attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = match e.unescape() {
                            Ok(text) => text.into_owned(),
                            // 未定义实体，保留原文
                            Err(_) => String::from_utf8_lossy(&e).into_owned(),
                        };
                        parent.nodes.push(XmlNode::Text(text));
                    }
                }
                Event::CData(e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .nodes
                            .push(XmlNode::Text(String::from_utf8_lossy(&e).into_owned()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(EpubError::XmlStructure("存在未闭合的元素".to_string()));
        }
        root.ok_or_else(|| EpubError::XmlStructure("文档中没有根元素".to_string()))
    }

    /// 根据开始标签创建元素（不含子节点）
    fn open(reader: &NsReader<&[u8]>, start: &BytesStart) -> Result<Element> {
        let (resolved, local) = reader.resolve_element(start.name());
        let namespace = owned_namespace(resolved);
        let local_name = String::from_utf8_lossy(local.as_ref()).into_owned();
        let prefix = start
            .name()
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());

        let mut attributes = Vec::new();
        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            // xmlns声明不是普通属性
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (resolved, local) = reader.resolve_attribute(attr.key);
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attributes.push(Attribute {
                namespace: owned_namespace(resolved),
                local_name: String::from_utf8_lossy(local.as_ref()).into_owned(),
                value,
            });
        }

        Ok(Element {
            namespace,
            prefix,
            local_name,
            attributes,
            nodes: Vec::new(),
        })
    }

    /// 将已闭合的元素挂到父元素上，没有父元素时作为根
    fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
        match stack.last_mut() {
            Some(parent) => parent.nodes.push(XmlNode::Element(element)),
            None => {
                if root.is_none() {
                    *root = Some(element);
                }
            }
        }
    }

    /// 本地名称
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// 命名空间URI
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// 源文档中使用的前缀（仅供展示，查询不依赖它）
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// 检查元素是否为指定命名空间下的指定名称
    pub fn is(&self, ns: Namespace, local_name: &str) -> bool {
        ns.matches(self.namespace()) && self.local_name == local_name
    }

    /// 全部属性
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// 获取无命名空间的属性值
    pub fn attr(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// 获取指定命名空间下的属性值
    pub fn attr_ns(&self, ns: Namespace, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| ns.matches(a.namespace.as_deref()) && a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// 全部子节点（元素与文本）
    pub fn nodes(&self) -> &[XmlNode] {
        &self.nodes
    }

    /// 子元素，按文档顺序
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// 指定命名空间下的全部子元素（相当于 `prefix:*`）
    pub fn children_in(&self, ns: Namespace) -> impl Iterator<Item = &Element> {
        self.children().filter(move |c| ns.matches(c.namespace()))
    }

    /// 指定名称的子元素
    pub fn children_named<'a>(
        &'a self,
        ns: Namespace,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children().filter(move |c| c.is(ns, local_name))
    }

    /// 第一个指定名称的子元素
    pub fn child(&self, ns: Namespace, local_name: &str) -> Option<&Element> {
        self.children().find(|c| c.is(ns, local_name))
    }

    /// 元素的文本内容（所有后代文本节点按顺序拼接）
    ///
    /// 没有任何文本节点时返回None。
    pub fn text(&self) -> Option<String> {
        let mut out = String::new();
        let mut found = false;
        self.collect_text(&mut out, &mut found);
        found.then_some(out)
    }

    fn collect_text(&self, out: &mut String, found: &mut bool) {
        for node in &self.nodes {
            match node {
                XmlNode::Text(text) => {
                    *found = true;
                    out.push_str(text);
                }
                XmlNode::Element(element) => element.collect_text(out, found),
            }
        }
    }

    /// 按路径查询子孙元素
    ///
    /// 路径由 `/` 分隔的步骤组成，每一步为 `前缀:本地名` 或 `前缀:*`，
    /// 前缀通过命名空间注册表解析。未知前缀不匹配任何元素；
    /// 不带前缀的步骤只匹配无命名空间的元素。
    ///
    /// ```rust
    /// use bookbinder::epub::xml::Element;
    ///
    /// let root = Element::parse(
    ///     r#"<package xmlns="http://www.idpf.org/2007/opf"><guide><reference type="toc"/></guide></package>"#,
    /// )?;
    /// assert_eq!(root.select("opf:guide/opf:reference").len(), 1);
    /// assert!(root.select("guide/reference").is_empty());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn select(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let Some(step) = Step::parse(raw) else {
                return Vec::new();
            };
            current = current
                .into_iter()
                .flat_map(|element| element.children().filter(move |c| step.matches(c)))
                .collect();
        }
        current
    }
}

/// 路径查询中的一步
#[derive(Debug, Clone, Copy)]
struct Step<'p> {
    namespace: Option<&'static str>,
    local_name: &'p str,
}

impl<'p> Step<'p> {
    fn parse(raw: &'p str) -> Option<Step<'p>> {
        match raw.split_once(':') {
            Some((prefix, local_name)) => Some(Step {
                namespace: Some(namespace::resolve(prefix)?),
                local_name,
            }),
            None => Some(Step {
                namespace: None,
                local_name: raw,
            }),
        }
    }

    fn matches(&self, element: &Element) -> bool {
        element.namespace() == self.namespace
            && (self.local_name == "*" || element.local_name() == self.local_name)
    }
}

fn owned_namespace(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        // xml前缀是预绑定的
        ResolveResult::Unknown(prefix) if prefix.as_slice() == b"xml" => Some(XML_NS.to_string()),
        ResolveResult::Unknown(_) | ResolveResult::Unbound => None,
    }
}
