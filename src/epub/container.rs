use crate::epub::error::{EpubError, Result};
use crate::epub::xml::Element;

/// container.xml的固定路径
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// OPF包文档的媒体类型
pub const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Container.xml中的rootfile信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// Container.xml的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container, EpubError>` - 解析后的Container信息
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let root = Element::parse(xml_content)?;
        Self::from_element(&root)
    }

    /// 从已解析的 `<container>` 元素构建
    pub fn from_element(root: &Element) -> Result<Container> {
        let mut elements = root.select("container:rootfiles/container:rootfile");
        if elements.is_empty() {
            // 部分文件省略了容器命名空间
            elements = root.select("rootfiles/rootfile");
        }

        let rootfiles: Vec<RootFile> = elements
            .into_iter()
            .filter_map(|e| {
                Some(RootFile {
                    full_path: e.attr("full-path")?.to_string(),
                    media_type: e.attr("media-type")?.to_string(),
                })
            })
            .filter(|rf| !rf.full_path.is_empty())
            .collect();

        if rootfiles.is_empty() {
            return Err(EpubError::ContainerParseError(
                "没有找到任何rootfile条目".to_string()
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 获取主要的OPF文件路径
    ///
    /// # 返回值
    /// * `Option<&str>` - OPF文件的完整路径
    pub fn opf_path(&self) -> Option<&str> {
        // 查找第一个application/oebps-package+xml类型的rootfile
        self.rootfiles
            .iter()
            .find(|rf| rf.media_type == OPF_MEDIA_TYPE)
            .or_else(|| self.rootfiles.first())
            .map(|rf| rf.full_path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container_xml() {
        let container_xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/toc.ncx" media-type="application/x-dtbncx+xml"/>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

        let container = Container::parse_xml(container_xml).expect("解析container.xml失败");
        assert_eq!(container.rootfiles.len(), 2);

        let first_rootfile = &container.rootfiles[0];
        assert_eq!(first_rootfile.full_path, "OEBPS/toc.ncx");
        assert_eq!(first_rootfile.media_type, "application/x-dtbncx+xml");

        assert_eq!(container.opf_path(), Some("OEBPS/content.opf"));
    }

    #[test]
    fn test_opf_path_falls_back_to_first() {
        let container = Container {
            rootfiles: vec![RootFile {
                full_path: "book.opf".to_string(),
                media_type: "text/xml".to_string(),
            }],
        };
        assert_eq!(container.opf_path(), Some("book.opf"));
    }

    #[test]
    fn test_container_without_namespace() {
        let container_xml = r#"<container version="1.0"><rootfiles>
            <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
        </rootfiles></container>"#;

        let container = Container::parse_xml(container_xml).expect("解析container.xml失败");
        assert_eq!(container.opf_path(), Some("content.opf"));
    }

    #[test]
    fn test_container_without_rootfile_is_error() {
        let container_xml = r#"<container xmlns="urn:oasis:names:tc:opendocument:xmlns:container"><rootfiles/></container>"#;
        let err = Container::parse_xml(container_xml).unwrap_err();
        assert!(matches!(err, EpubError::ContainerParseError(_)));
    }
}
