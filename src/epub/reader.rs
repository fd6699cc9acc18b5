use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::epub::container::{CONTAINER_PATH, Container};
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{Book, ManifestItem, ParseOptions};
use crate::epub::source::{DirSource, ResourceSource, ZipSource};
use crate::epub::xml::Element;

/// 表示一个EPUB出版物
///
/// 负责定位包文档并读取其引用的资源，资源来自任意 [`ResourceSource`]。
pub struct Epub<S = ZipSource<File>> {
    source: S,
}

impl Epub<ZipSource<File>> {
    /// 从文件路径创建Epub实例
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub, EpubError>` - 成功返回Epub实例，mimetype不正确时返回错误
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "打开EPUB文件");
        Ok(Epub {
            source: ZipSource::open(path)?,
        })
    }
}

impl Epub<DirSource> {
    /// 从已解压的目录创建Epub实例
    pub fn open_dir<P: AsRef<Path>>(path: P) -> Self {
        Epub {
            source: DirSource::new(path.as_ref()),
        }
    }
}

impl<S: ResourceSource> Epub<S> {
    pub fn from_source(source: S) -> Self {
        Epub { source }
    }

    pub fn source(&mut self) -> &mut S {
        &mut self.source
    }

    /// 列出EPUB中的所有文件
    pub fn list_files(&mut self) -> Result<Vec<String>> {
        self.source.list()
    }

    /// 解析container.xml文件
    ///
    /// # 返回值
    /// * `Result<Container, EpubError>` - 解析后的Container信息
    pub fn container(&mut self) -> Result<Container> {
        let content = self.source.read_string(CONTAINER_PATH)?;
        Container::parse_xml(&content)
    }

    /// 获取主要的OPF文件路径
    ///
    /// # 返回值
    /// * `Result<String, EpubError>` - OPF文件的完整路径
    pub fn opf_path(&mut self) -> Result<String> {
        let container = self.container()?;
        container.opf_path().map(str::to_string).ok_or_else(|| {
            EpubError::ContainerParseError("container.xml中没有找到有效的rootfile".to_string())
        })
    }

    /// 获取OPF文件所在的目录，位于根目录时为空字符串
    pub fn opf_directory(&mut self) -> Result<String> {
        let opf_path = self.opf_path()?;
        Ok(parent_directory(&opf_path).to_string())
    }

    /// 解析包文档（默认选项）
    pub fn load_book(&mut self) -> Result<Book> {
        self.load_book_with(&ParseOptions::default())
    }

    /// 使用指定选项解析包文档
    ///
    /// 只有资源缺失或XML本身无法解析时才返回错误，
    /// 包文档内容的问题以诊断信息的形式保存在 [`Book`] 中。
    pub fn load_book_with(&mut self, options: &ParseOptions) -> Result<Book> {
        let opf_path = self.opf_path()?;
        let content = self.source.read_string(&opf_path)?;

        let root = Element::parse(&content).map_err(|e| match e {
            EpubError::XmlError(xml_err) => {
                EpubError::OpfParseError(format!("{}: {}", opf_path, xml_err))
            }
            other => other,
        })?;

        let book = Book::from_root(Arc::new(root), options);
        tracing::info!(
            path = %opf_path,
            title = book.document().title().unwrap_or("未知标题"),
            diagnostics = book.diagnostics().len(),
            "包文档解析完成"
        );
        Ok(book)
    }

    /// 读取清单项对应的资源，href相对于OPF文件所在目录
    pub fn read_resource(&mut self, item: &ManifestItem) -> Result<Vec<u8>> {
        let base = self.opf_directory()?;
        let path = resolve_href(&base, &item.href);
        self.source.read_bytes(&path)
    }

    /// 读取清单项对应的文本资源
    pub fn read_resource_string(&mut self, item: &ManifestItem) -> Result<String> {
        let base = self.opf_directory()?;
        let path = resolve_href(&base, &item.href);
        self.source.read_string(&path)
    }
}

fn parent_directory(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// 将相对于OPF目录的href解析为包内路径
///
/// 去掉片段标识符，对每一段做百分号解码，处理 `.` 和 `..`。
///
/// # 参数
/// * `base` - OPF文件所在目录
/// * `href` - 清单或指南中的href
pub fn resolve_href(base: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let mut segments: Vec<String> = if href.starts_with('/') {
        Vec::new()
    } else {
        base.split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };

    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => {
                // 非法的UTF-8编码保留原文
                let decoded = urlencoding::decode(other)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| other.to_string());
                segments.push(decoded);
            }
        }
    }

    segments.join("/")
}
