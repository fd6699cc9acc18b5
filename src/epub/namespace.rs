//! 命名空间注册表
//!
//! 提供包文档查询所用的规范命名空间绑定。所有元素查询都以 [`Namespace`]
//! 为参数，按命名空间URI匹配，与源文档中实际声明的前缀无关。

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// OPF包命名空间
pub const OPF_NS: &str = "http://www.idpf.org/2007/opf";
/// Dublin Core元素命名空间
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
/// XML保留命名空间
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
/// OCF容器命名空间（META-INF/container.xml）
pub const CONTAINER_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:container";

/// 已知命名空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Opf,
    Dc,
    Xml,
    Container,
}

static REGISTRY: Lazy<HashMap<&'static str, Namespace>> = Lazy::new(|| {
    Namespace::ALL
        .iter()
        .map(|ns| (ns.prefix(), *ns))
        .collect()
});

impl Namespace {
    /// 注册表中的全部命名空间
    pub const ALL: [Namespace; 4] = [
        Namespace::Opf,
        Namespace::Dc,
        Namespace::Xml,
        Namespace::Container,
    ];

    /// 规范前缀
    pub const fn prefix(self) -> &'static str {
        match self {
            Namespace::Opf => "opf",
            Namespace::Dc => "dc",
            Namespace::Xml => "xml",
            Namespace::Container => "container",
        }
    }

    /// 命名空间URI
    pub const fn uri(self) -> &'static str {
        match self {
            Namespace::Opf => OPF_NS,
            Namespace::Dc => DC_NS,
            Namespace::Xml => XML_NS,
            Namespace::Container => CONTAINER_NS,
        }
    }

    /// 根据规范前缀查找命名空间
    pub fn from_prefix(prefix: &str) -> Option<Namespace> {
        REGISTRY.get(prefix).copied()
    }

    /// 检查URI是否属于该命名空间
    pub fn matches(self, uri: Option<&str>) -> bool {
        uri == Some(self.uri())
    }
}

/// 获取前缀对应的命名空间绑定
///
/// # 参数
/// * `prefix` - 规范前缀，如 `opf`、`dc`
///
/// # 返回值
/// * `HashMap<&str, &str>` - `{前缀: URI}`，未知前缀返回空映射
pub fn namespaces_for(prefix: &str) -> HashMap<&'static str, &'static str> {
    Namespace::from_prefix(prefix)
        .map(|ns| HashMap::from([(ns.prefix(), ns.uri())]))
        .unwrap_or_default()
}

/// 将规范前缀解析为命名空间URI
pub fn resolve(prefix: &str) -> Option<&'static str> {
    Namespace::from_prefix(prefix).map(Namespace::uri)
}
