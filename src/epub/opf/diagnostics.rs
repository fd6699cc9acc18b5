//! 诊断信息模块
//!
//! 解析过程中被容忍的问题（缺失的结构元素、格式不完整的条目、未识别的元素）
//! 不会导致失败，而是记录为诊断信息，同时以 `tracing` 事件输出。

use crate::epub::opf::config::ParseOptions;
use crate::epub::xml::Element;
use serde::Serialize;
use std::fmt;

/// 诊断类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// 必需的容器元素缺失（metadata、manifest）
    StructuralAbsence,
    /// 单个元素缺少必需内容，已丢弃
    ElementMalformed,
    /// 未建模的元素或属性模式，已忽略
    UnrecognizedElement,
    /// 清单中的重复id，后出现的条目替换了先前的条目
    DuplicateId,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::StructuralAbsence => "结构缺失",
            DiagnosticKind::ElementMalformed => "元素不完整",
            DiagnosticKind::UnrecognizedElement => "未识别元素",
            DiagnosticKind::DuplicateId => "重复ID",
        };
        f.write_str(name)
    }
}

/// 单条诊断信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 相关元素，如 `opf:item`
    pub element: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] <{}> {}", self.kind, self.element, self.message)
    }
}

/// 诊断信息集合，按记录顺序保存
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 指定类别的诊断信息
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// 单次解析过程的上下文：解析选项与诊断收集
pub struct ParseContext<'o> {
    options: &'o ParseOptions,
    diagnostics: Diagnostics,
}

impl<'o> ParseContext<'o> {
    pub fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn options(&self) -> &'o ParseOptions {
        self.options
    }

    /// 记录一条诊断信息
    pub fn record(
        &mut self,
        kind: DiagnosticKind,
        element: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            element: element.into(),
            message: message.into(),
        };
        tracing::debug!(kind = ?diagnostic.kind, element = %diagnostic.element, "{}", diagnostic.message);

        if self.options.collect_diagnostics {
            self.diagnostics.entries.push(diagnostic);
        }
    }

    /// 按选项提取元素文本
    ///
    /// 没有文本节点，或去除空白后为空时返回None。
    pub fn text_of(&self, element: &Element) -> Option<String> {
        let text = element.text()?;
        let text = if self.options.trim_text {
            text.trim().to_string()
        } else {
            text
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}
