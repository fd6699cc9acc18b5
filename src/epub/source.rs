//! 资源来源
//!
//! EPUB中的文件可以来自zip压缩包、解压后的目录，或者内存。
//! 读取器只依赖 [`ResourceSource`]，不关心文件具体存放在哪里。

use crate::epub::error::{EpubError, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

/// EPUB的mimetype文件内容
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// 按包内路径读取资源
pub trait ResourceSource {
    /// 读取资源的二进制内容
    ///
    /// # 参数
    /// * `path` - 相对于包根目录的路径，使用 `/` 分隔
    ///
    /// # 返回值
    /// * `Result<Vec<u8>>` - 资源不存在时返回 [`EpubError::MissingResource`]
    fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>>;

    /// 读取UTF-8文本资源，去掉开头的BOM
    fn read_string(&mut self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| EpubError::InvalidEncoding(path.to_string()))?;
        Ok(match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        })
    }

    /// 列出所有资源路径
    fn list(&mut self) -> Result<Vec<String>>;

    /// 资源是否存在
    fn contains(&mut self, path: &str) -> bool {
        self.read_bytes(path).is_ok()
    }
}

/// zip压缩包中的资源
pub struct ZipSource<R> {
    archive: ZipArchive<R>,
}

impl ZipSource<File> {
    /// 打开EPUB文件并验证mimetype
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read + Seek> ZipSource<R> {
    /// 从任意可读取的zip数据创建
    ///
    /// 检查步骤：
    /// 1. 检查是否存在mimetype文件
    /// 2. 验证mimetype文件的内容是否为"application/epub+zip"
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let mut source = ZipSource { archive };
        source.validate()?;
        Ok(source)
    }

    fn validate(&mut self) -> Result<()> {
        let mut file = match self.archive.by_name("mimetype") {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(EpubError::MissingMimetype),
            Err(e) => return Err(e.into()),
        };

        let mut content = String::new();
        file.read_to_string(&mut content)?;

        // 去除可能的换行符和空白字符
        let content = content.trim();
        if content != EPUB_MIMETYPE {
            return Err(EpubError::InvalidMimetype {
                expected: EPUB_MIMETYPE.to_string(),
                found: content.to_string(),
            });
        }

        tracing::debug!("mimetype验证通过");
        Ok(())
    }
}

impl<R: Read + Seek> ResourceSource for ZipSource<R> {
    fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = match self.archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(EpubError::MissingResource(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    fn list(&mut self) -> Result<Vec<String>> {
        Ok(self.archive.file_names().map(str::to_string).collect())
    }

    fn contains(&mut self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }
}

/// 已解压到目录中的EPUB
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 包内路径转换为文件系统路径，不允许跳出根目录
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn collect(&self, dir: &Path, files: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.collect(&path, files)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                files.push(name);
            }
        }
        Ok(())
    }
}

impl ResourceSource for DirSource {
    fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let full_path = self
            .resolve(path)
            .filter(|p| p.is_file())
            .ok_or_else(|| EpubError::MissingResource(path.to_string()))?;
        Ok(fs::read(full_path)?)
    }

    fn list(&mut self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        self.collect(&self.root, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn contains(&mut self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }
}

/// 内存中的资源，主要用于测试和嵌入场景
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加资源，返回自身以便链式调用
    pub fn with(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }
}

impl ResourceSource for MemorySource {
    fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| EpubError::MissingResource(path.to_string()))
    }

    fn list(&mut self) -> Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn contains(&mut self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}
