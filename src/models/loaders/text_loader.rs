//! 原始文本来源
//!
//! PDF 渲染和 OCR 不在本 crate 内完成，这里只约定"按页给出文本"的接口，
//! 并提供一个读取纯文本文件（`pdftotext` 等工具的输出）的实现。

use crate::error::{AppError, AppResult};
use std::path::Path;
use tracing::{debug, warn};

/// 分页符，`pdftotext` 默认用它分隔页面
const PAGE_BREAK: char = '\u{000C}';

/// 文本提取服务
pub trait TextSource {
    /// 返回每一页的文本
    fn extract_pages(&self) -> AppResult<Vec<String>>;
}

/// 按分页符切分的纯文本文档
#[derive(Debug, Clone)]
pub struct PlainTextDocument {
    content: String,
}

impl PlainTextDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl TextSource for PlainTextDocument {
    fn extract_pages(&self) -> AppResult<Vec<String>> {
        Ok(self
            .content
            .split(PAGE_BREAK)
            .map(|page| page.to_string())
            .collect())
    }
}

/// 拼接所有页面文本，页与页之间用换行分隔
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n")
}

/// 从文本来源读取整篇原始文本
///
/// 提取失败视为"没有可用文本"，返回空字符串，由调用方决定是否报错
pub fn read_raw_text(source: &impl TextSource) -> String {
    match source.extract_pages() {
        Ok(pages) => {
            debug!("文本提取完成，共 {} 页", pages.len());
            join_pages(&pages)
        }
        Err(e) => {
            warn!("⚠️ 文本提取失败，按空文本处理: {}", e);
            String::new()
        }
    }
}

/// 异步读取文本文件
pub async fn load_text_file(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))
}
