//! 题目解析服务 - 业务能力层
//!
//! 只负责把一个文本块解析成一道选择题（或拒绝它），不关心题号分配和流程
//!
//! 解析顺序：
//! 1. 题干：从块首到第一个选项标记或答案标记；都没有时取前 200 个字符
//! 2. 选项：行首 `A)` / `A.` 形式，遇到下一个选项、答案标记或块尾结束
//! 3. 选项兜底：按 [`MissingOptionsPolicy`] 处理
//! 4. 答案：`Answer: B` 形式（大小写不敏感），缺失时按 [`MissingAnswerPolicy`] 处理
//! 5. 难度和解析：根据题干生成，仅用于展示

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{ConfigError, QuestionError};
use crate::models::question::{
    AnswerKey, Difficulty, OptionLabel, OptionMap, ParsedQuestion,
};
use crate::services::segmenter::QuestionBlock;

/// 行首选项标记：`A)` 或 `A.`
static OPTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*([A-E])[.)][ \t]*").unwrap());

/// 答案标记：行首 `Answer:` / `Answer -`、单独一行的 `Answer B`，或任意位置的 `Answer:`
///
/// 行首的普通单词 "Answer"（如 "Answer the following"）不算答案标记
static ANSWER_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*answer[ \t]*[:\-]|^[ \t]*answer[ \t]+\(?[A-E]\)?[ \t]*$|\banswer[ \t]*:")
        .unwrap()
});

/// 答案标记后跟单个字母
static ANSWER_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?mi)(?:^[ \t]*answer[ \t]*[:\-]|\banswer[ \t]*:)[ \t]*[:\-]?[ \t]*\(?([A-E])\b|^[ \t]*answer[ \t]+\(?([A-E])\)?[ \t]*$",
    )
    .unwrap()
});

/// 找不到选项或答案标记时，题干截取的字符数
pub const QUESTION_TEXT_FALLBACK_CHARS: usize = 200;

/// 缺失答案时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingAnswerPolicy {
    /// 从已有选项中随机指定一个
    #[default]
    RandomGuess,
    /// 不指定答案，标记为未核实
    MarkUnverified,
    /// 拒绝该题
    Reject,
}

impl FromStr for MissingAnswerPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "random-guess" | "random" => Ok(Self::RandomGuess),
            "mark-unverified" | "unverified" => Ok(Self::MarkUnverified),
            "reject" => Ok(Self::Reject),
            _ => Err(ConfigError::EnvVarParseFailed {
                var_name: "missing answer policy".to_string(),
                value: s.to_string(),
                expected_type: "random-guess | mark-unverified | reject".to_string(),
            }),
        }
    }
}

/// 缺失选项（少于 2 个）时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingOptionsPolicy {
    /// 生成 "Option A" … "Option D" 占位选项
    #[default]
    Placeholder,
    /// 拒绝该题
    Reject,
}

impl FromStr for MissingOptionsPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder),
            "reject" => Ok(Self::Reject),
            _ => Err(ConfigError::EnvVarParseFailed {
                var_name: "missing options policy".to_string(),
                value: s.to_string(),
                expected_type: "placeholder | reject".to_string(),
            }),
        }
    }
}

/// 解析器选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    pub missing_answer: MissingAnswerPolicy,
    pub missing_options: MissingOptionsPolicy,
    /// 随机答案的种子；`None` 时使用系统熵
    pub seed: Option<u64>,
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyText,
    MissingOptions,
    MissingAnswer,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyText => write!(f, "题干为空"),
            RejectReason::MissingOptions => write!(f, "选项不足"),
            RejectReason::MissingAnswer => write!(f, "缺少答案"),
        }
    }
}

/// 尚未分配ID的题目
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub text: String,
    pub options: OptionMap,
    pub answer: AnswerKey,
    pub difficulty: Difficulty,
    pub explanation: String,
    /// 是否使用了占位选项
    pub placeholder_options: bool,
}

impl QuestionDraft {
    /// 分配ID并校验，得到最终题目
    pub fn into_question(self, id: u32) -> Result<ParsedQuestion, QuestionError> {
        ParsedQuestion::new(
            id,
            self.text,
            self.options,
            self.answer,
            self.difficulty,
            self.explanation,
        )
    }
}

/// 题目解析服务
///
/// 持有随机数源，因此解析需要 `&mut self`
pub struct QuestionParser {
    options: ParserOptions,
    rng: StdRng,
}

impl QuestionParser {
    pub fn new(options: ParserOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { options, rng }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// 解析一个文本块
    pub fn parse(&mut self, block: &QuestionBlock<'_>) -> Result<QuestionDraft, RejectReason> {
        let body = block.text.trim();

        let option_spans: Vec<(OptionLabel, usize, usize)> = OPTION_MARKER
            .captures_iter(body)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let letter = caps.get(1)?.as_str().chars().next()?;
                Some((OptionLabel::from_char(letter)?, whole.start(), whole.end()))
            })
            .collect();
        let answer_starts: Vec<usize> = ANSWER_MARKER.find_iter(body).map(|m| m.start()).collect();

        // 1. 题干
        let text = extract_question_text(body, &option_spans, &answer_starts);
        if text.is_empty() {
            debug!("文本块 @{} 被拒绝: {}", block.offset, RejectReason::EmptyText);
            return Err(RejectReason::EmptyText);
        }

        // 2. 选项
        let mut options = OptionMap::new();
        for (i, (label, _, text_start)) in option_spans.iter().enumerate() {
            let next_option = option_spans.get(i + 1).map(|(_, start, _)| *start);
            let next_answer = answer_starts.iter().copied().find(|pos| pos >= text_start);
            let end = [next_option, next_answer]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(body.len());
            let option_text = collapse_lines(&body[*text_start..end]);
            if options.insert(*label, option_text) {
                debug!("文本块 @{} 选项 {} 重复，使用后出现的内容", block.offset, label);
            }
        }

        // 3. 选项兜底
        let mut placeholder_options = false;
        if options.len() < 2 {
            match self.options.missing_options {
                MissingOptionsPolicy::Placeholder => {
                    warn!(
                        "⚠️ 文本块 @{} 只识别到 {} 个选项，使用占位选项 A–D",
                        block.offset,
                        options.len()
                    );
                    options = OptionMap::placeholders();
                    placeholder_options = true;
                }
                MissingOptionsPolicy::Reject => {
                    debug!("文本块 @{} 被拒绝: {}", block.offset, RejectReason::MissingOptions);
                    return Err(RejectReason::MissingOptions);
                }
            }
        }

        // 4. 答案
        let declared = ANSWER_KEY
            .captures(body)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .and_then(|m| m.as_str().chars().next())
            .and_then(OptionLabel::from_char);
        let answer = match declared {
            Some(label) if options.contains(label) => AnswerKey::Declared(label),
            other => {
                if let Some(label) = other {
                    warn!(
                        "⚠️ 文本块 @{} 的答案 {} 不在选项中，按缺失答案处理",
                        block.offset, label
                    );
                }
                self.resolve_missing_answer(&options, block.offset)?
            }
        };

        // 5. 展示用元数据
        let difficulty = estimate_difficulty(&text);
        let explanation = explain(answer);

        Ok(QuestionDraft {
            text,
            options,
            answer,
            difficulty,
            explanation,
            placeholder_options,
        })
    }

    fn resolve_missing_answer(
        &mut self,
        options: &OptionMap,
        offset: usize,
    ) -> Result<AnswerKey, RejectReason> {
        match self.options.missing_answer {
            MissingAnswerPolicy::RandomGuess => {
                let labels: Vec<OptionLabel> = options.labels().collect();
                let label = labels
                    .choose(&mut self.rng)
                    .copied()
                    .ok_or(RejectReason::MissingOptions)?;
                debug!("文本块 @{} 缺少答案，随机指定为 {}", offset, label);
                Ok(AnswerKey::Guessed(label))
            }
            MissingAnswerPolicy::MarkUnverified => {
                debug!("文本块 @{} 缺少答案，标记为未核实", offset);
                Ok(AnswerKey::Unverified)
            }
            MissingAnswerPolicy::Reject => {
                debug!("文本块 @{} 被拒绝: {}", offset, RejectReason::MissingAnswer);
                Err(RejectReason::MissingAnswer)
            }
        }
    }
}

impl Default for QuestionParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

fn extract_question_text(
    body: &str,
    option_spans: &[(OptionLabel, usize, usize)],
    answer_starts: &[usize],
) -> String {
    let first_option = option_spans.first().map(|(_, start, _)| *start);
    let first_answer = answer_starts.first().copied();

    match [first_option, first_answer].into_iter().flatten().min() {
        Some(cut) => body[..cut].trim().to_string(),
        None => body
            .chars()
            .take(QUESTION_TEXT_FALLBACK_CHARS)
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

/// 合并选项文本中的换行
fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn estimate_difficulty(text: &str) -> Difficulty {
    match text.chars().count() {
        0..=79 => Difficulty::Easy,
        80..=199 => Difficulty::Medium,
        _ => Difficulty::Hard,
    }
}

fn explain(answer: AnswerKey) -> String {
    match answer {
        AnswerKey::Declared(label) => format!("Correct answer is {}.", label),
        AnswerKey::Guessed(label) => format!(
            "No answer key was found; {} was assigned at random and may be wrong.",
            label
        ),
        AnswerKey::Unverified => "No answer key was found for this question.".to_string(),
    }
}
