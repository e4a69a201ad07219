//! 文本切分服务 - 业务能力层
//!
//! 只负责把整篇原始文本切成"疑似一道题"的文本块，不关心块内结构

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// 题号标记：`Q1.`、行首 `1.`、行首 `Question 1`
static ENUMERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*question[ \t]+(\d+)[ \t]*[.:)]?|^[ \t]*(\d+)\.(?:[ \t]+|$)|\bq(\d+)\.")
        .unwrap()
});

/// 空行（可含空白字符）
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*(?:\r?\n[ \t]*)+").unwrap());

/// 文本块
///
/// 借用原始文本的一段，只在一次提取过程中存在
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionBlock<'a> {
    /// 块在原始文本中的起始字节偏移（含题号标记）
    pub offset: usize,
    /// 题号标记中的数字（段落切分时为 `None`）
    pub number: Option<u32>,
    /// 块内容（不含题号标记）
    pub text: &'a str,
}

/// 切分方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStyle {
    Enumerated,
    Paragraphs,
}

/// 文本切分服务
///
/// 职责：
/// - 先按题号切分
/// - 文本中没有任何题号时，按空行切分
/// - 丢弃第一个题号之前的前言和纯空白块
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSegmenter;

impl TextSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// 切分原始文本
    pub fn segment<'a>(&self, raw: &'a str) -> Vec<QuestionBlock<'a>> {
        self.segment_with_style(raw).0
    }

    /// 切分原始文本，同时返回实际采用的切分方式
    ///
    /// 只要出现过题号标记就按题号切分，第一个标记之前的前言和标记之后的空行都不会再被拆开；
    /// 完全没有题号时才按空行切分
    pub fn segment_with_style<'a>(&self, raw: &'a str) -> (Vec<QuestionBlock<'a>>, SegmentStyle) {
        if ENUMERATOR.is_match(raw) {
            let enumerated = split_enumerated(raw);
            debug!("按题号切分得到 {} 个文本块", enumerated.len());
            return (enumerated, SegmentStyle::Enumerated);
        }

        let paragraphs = split_paragraphs(raw);
        debug!("未找到题号，按空行切分得到 {} 个文本块", paragraphs.len());
        (paragraphs, SegmentStyle::Paragraphs)
    }
}

fn split_enumerated(raw: &str) -> Vec<QuestionBlock<'_>> {
    let markers: Vec<_> = ENUMERATOR.captures_iter(raw).collect();
    let mut blocks = Vec::with_capacity(markers.len());

    for (i, caps) in markers.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(raw.len());
        let text = &raw[whole.end()..end];
        if text.trim().is_empty() {
            continue;
        }

        let number = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .and_then(|m| m.as_str().parse().ok());

        blocks.push(QuestionBlock {
            offset: whole.start(),
            number,
            text,
        });
    }

    blocks
}

fn split_paragraphs(raw: &str) -> Vec<QuestionBlock<'_>> {
    let mut blocks = Vec::new();
    let mut start = 0;

    let mut push = |from: usize, to: usize| {
        let text = &raw[from..to];
        if !text.trim().is_empty() {
            blocks.push(QuestionBlock {
                offset: from,
                number: None,
                text,
            });
        }
    };

    for sep in BLANK_LINES.find_iter(raw) {
        push(start, sep.start());
        start = sep.end();
    }
    push(start, raw.len());

    blocks
}
