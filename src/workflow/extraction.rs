//! 题目提取流程 - 流程层
//!
//! 核心职责：定义"一篇文档"的完整提取流程
//!
//! 流程顺序：
//! 1. TextSegmenter 切分文本块
//! 2. QuestionParser 逐块解析
//! 3. 为未被拒绝的题目按文档顺序分配ID 1..N
//!
//! 单个文本块失败只会被跳过，整个提取永远不会部分失败

use tracing::{debug, warn};

use crate::models::question::{AnswerKey, QuestionSet};
use crate::services::question_parser::{ParserOptions, QuestionParser};
use crate::services::segmenter::{SegmentStyle, TextSegmenter};
use crate::utils::logging::truncate_text;

/// 提取统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub blocks: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub placeholder_options: usize,
    pub guessed_answers: usize,
    pub unverified_answers: usize,
    pub paragraph_fallback: bool,
}

/// 题目提取流程
pub struct ExtractionPipeline {
    segmenter: TextSegmenter,
    parser: QuestionParser,
}

impl ExtractionPipeline {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            segmenter: TextSegmenter::new(),
            parser: QuestionParser::new(options),
        }
    }

    /// 从原始文本提取题目集合
    ///
    /// 没有任何题目时返回空集合，由调用方决定是否报错
    pub fn extract(&mut self, raw: &str) -> QuestionSet {
        self.extract_with_stats(raw).0
    }

    /// 提取题目集合并返回统计信息
    pub fn extract_with_stats(&mut self, raw: &str) -> (QuestionSet, ExtractionStats) {
        let mut stats = ExtractionStats::default();

        if raw.trim().is_empty() {
            warn!("⚠️ 没有可用的文本，返回空题目集合");
            return (QuestionSet::empty(), stats);
        }

        let (blocks, style) = self.segmenter.segment_with_style(raw);
        stats.blocks = blocks.len();
        stats.paragraph_fallback = style == SegmentStyle::Paragraphs;

        let mut questions = Vec::with_capacity(blocks.len());
        for block in &blocks {
            let draft = match self.parser.parse(block) {
                Ok(draft) => draft,
                Err(reason) => {
                    stats.rejected += 1;
                    debug!(
                        "跳过文本块 @{} (题号 {:?}): {} | {}",
                        block.offset,
                        block.number,
                        reason,
                        truncate_text(block.text.trim(), 40)
                    );
                    continue;
                }
            };

            let id = (questions.len() + 1) as u32;
            let placeholder = draft.placeholder_options;
            let answer = draft.answer;
            match draft.into_question(id) {
                Ok(question) => {
                    if placeholder {
                        stats.placeholder_options += 1;
                    }
                    match answer {
                        AnswerKey::Guessed(_) => stats.guessed_answers += 1,
                        AnswerKey::Unverified => stats.unverified_answers += 1,
                        AnswerKey::Declared(_) => {}
                    }
                    questions.push(question);
                }
                Err(e) => {
                    stats.rejected += 1;
                    warn!("⚠️ 文本块 @{} 校验失败，已跳过: {}", block.offset, e);
                }
            }
        }
        stats.accepted = questions.len();

        debug!(
            "提取完成: 文本块 {}, 题目 {}, 跳过 {}",
            stats.blocks, stats.accepted, stats.rejected
        );

        // ID 按顺序分配，不会重复
        let set = QuestionSet::new(questions).unwrap_or_default();
        (set, stats)
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}
