//! 题目数据模型
//!
//! 从文本中解析出的选择题，以及一次提取得到的题目集合。
//! 所有不变式都在构造时校验，之后只读。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuestionError;

/// 选项字母（A–E）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
    E,
}

impl OptionLabel {
    /// 所有合法字母，按顺序
    pub const ALL: [OptionLabel; 5] = [
        OptionLabel::A,
        OptionLabel::B,
        OptionLabel::C,
        OptionLabel::D,
        OptionLabel::E,
    ];

    /// 从字符解析（大小写不敏感）
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            'E' => Some(OptionLabel::E),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            OptionLabel::A => 'A',
            OptionLabel::B => 'B',
            OptionLabel::C => 'C',
            OptionLabel::D => 'D',
            OptionLabel::E => 'E',
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLabel {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                OptionLabel::from_char(c).ok_or_else(|| QuestionError::InvalidLabel(s.to_string()))
            }
            _ => Err(QuestionError::InvalidLabel(s.to_string())),
        }
    }
}

/// 单个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: OptionLabel,
    pub text: String,
}

/// 有序选项表
///
/// 字母唯一，顺序为首次出现的顺序；重复字母覆盖原有文本（后出现者生效）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionMap(Vec<QuestionOption>);

impl OptionMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// 占位选项 A–D（"Option A" … "Option D"）
    pub fn placeholders() -> Self {
        let mut map = Self::new();
        for label in &OptionLabel::ALL[..4] {
            map.insert(*label, format!("Option {}", label));
        }
        map
    }

    /// 插入选项，返回是否覆盖了已有字母
    pub fn insert(&mut self, label: OptionLabel, text: impl Into<String>) -> bool {
        let text = text.into();
        match self.0.iter_mut().find(|opt| opt.label == label) {
            Some(existing) => {
                existing.text = text;
                true
            }
            None => {
                self.0.push(QuestionOption { label, text });
                false
            }
        }
    }

    pub fn get(&self, label: OptionLabel) -> Option<&str> {
        self.0
            .iter()
            .find(|opt| opt.label == label)
            .map(|opt| opt.text.as_str())
    }

    pub fn contains(&self, label: OptionLabel) -> bool {
        self.0.iter().any(|opt| opt.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = OptionLabel> + '_ {
        self.0.iter().map(|opt| opt.label)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionOption> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 第一个重复出现的字母；`insert` 不会产生重复，只有反序列化的数据可能出现
    fn first_duplicate(&self) -> Option<OptionLabel> {
        self.0.iter().enumerate().find_map(|(i, opt)| {
            self.0[..i]
                .iter()
                .any(|earlier| earlier.label == opt.label)
                .then_some(opt.label)
        })
    }
}

impl<'a> IntoIterator for &'a OptionMap {
    type Item = &'a QuestionOption;
    type IntoIter = std::slice::Iter<'a, QuestionOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// 难度（仅用于展示，不参与评分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "简单",
            Difficulty::Medium => "中等",
            Difficulty::Hard => "困难",
        };
        f.write_str(name)
    }
}

/// 答案来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// 文本中明确给出
    Declared,
    /// 文本缺失答案，随机指定
    Guessed,
    /// 文本缺失答案，未指定
    Unverified,
}

/// 答案键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKey {
    Declared(OptionLabel),
    Guessed(OptionLabel),
    Unverified,
}

impl AnswerKey {
    pub fn label(self) -> Option<OptionLabel> {
        match self {
            AnswerKey::Declared(label) | AnswerKey::Guessed(label) => Some(label),
            AnswerKey::Unverified => None,
        }
    }

    pub fn source(self) -> AnswerSource {
        match self {
            AnswerKey::Declared(_) => AnswerSource::Declared,
            AnswerKey::Guessed(_) => AnswerSource::Guessed,
            AnswerKey::Unverified => AnswerSource::Unverified,
        }
    }
}

/// 解析后的选择题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct ParsedQuestion {
    id: u32,
    text: String,
    options: OptionMap,
    answer: AnswerKey,
    difficulty: Difficulty,
    explanation: String,
}

impl ParsedQuestion {
    /// 创建题目并校验不变式
    ///
    /// - `id` 从 1 开始
    /// - 题干非空
    /// - 至少 2 个选项，字母不重复
    /// - 答案字母必须在选项中
    pub fn new(
        id: u32,
        text: impl Into<String>,
        options: OptionMap,
        answer: AnswerKey,
        difficulty: Difficulty,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if id == 0 {
            return Err(QuestionError::ZeroId);
        }
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText { id });
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                id,
                count: options.len(),
            });
        }
        if let Some(label) = options.first_duplicate() {
            return Err(QuestionError::DuplicateLabel { id, label });
        }
        if let Some(label) = answer.label() {
            if !options.contains(label) {
                return Err(QuestionError::AnswerNotInOptions { id, label });
            }
        }

        Ok(Self {
            id,
            text,
            options,
            answer,
            difficulty,
            explanation: explanation.into(),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    pub fn answer(&self) -> AnswerKey {
        self.answer
    }

    /// 正确答案字母；未核实的题目返回 `None`
    pub fn correct_label(&self) -> Option<OptionLabel> {
        self.answer.label()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// 题目的序列化形式
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestionRecord {
    id: u32,
    text: String,
    options: OptionMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correct: Option<OptionLabel>,
    answer_source: AnswerSource,
    difficulty: Difficulty,
    #[serde(default)]
    explanation: String,
}

impl TryFrom<QuestionRecord> for ParsedQuestion {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let answer = match (record.answer_source, record.correct) {
            (AnswerSource::Declared, Some(label)) => AnswerKey::Declared(label),
            (AnswerSource::Guessed, Some(label)) => AnswerKey::Guessed(label),
            (AnswerSource::Unverified, None) => AnswerKey::Unverified,
            (AnswerSource::Unverified, Some(_)) | (_, None) => {
                return Err(QuestionError::AnswerSourceMismatch { id: record.id })
            }
        };
        ParsedQuestion::new(
            record.id,
            record.text,
            record.options,
            answer,
            record.difficulty,
            record.explanation,
        )
    }
}

impl From<ParsedQuestion> for QuestionRecord {
    fn from(q: ParsedQuestion) -> Self {
        Self {
            id: q.id,
            text: q.text,
            options: q.options,
            correct: q.answer.label(),
            answer_source: q.answer.source(),
            difficulty: q.difficulty,
            explanation: q.explanation,
        }
    }
}

/// 题目集合
///
/// 按文档顺序排列，ID 唯一。创建后由会话只读共享。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionSetRecord")]
pub struct QuestionSet {
    questions: Vec<ParsedQuestion>,
}

#[derive(Deserialize)]
struct QuestionSetRecord {
    #[serde(default)]
    questions: Vec<ParsedQuestion>,
}

impl TryFrom<QuestionSetRecord> for QuestionSet {
    type Error = QuestionError;

    fn try_from(record: QuestionSetRecord) -> Result<Self, Self::Error> {
        QuestionSet::new(record.questions)
    }
}

impl QuestionSet {
    /// 创建题目集合，校验 ID 唯一
    pub fn new(questions: Vec<ParsedQuestion>) -> Result<Self, QuestionError> {
        let mut seen = std::collections::HashSet::with_capacity(questions.len());
        for q in &questions {
            if !seen.insert(q.id()) {
                return Err(QuestionError::DuplicateId { id: q.id() });
            }
        }
        Ok(Self { questions })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 按位置获取（0-based）
    pub fn get(&self, index: usize) -> Option<&ParsedQuestion> {
        self.questions.get(index)
    }

    /// 按题目ID获取
    pub fn by_id(&self, id: u32) -> Option<&ParsedQuestion> {
        self.questions.iter().find(|q| q.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParsedQuestion> {
        self.questions.iter()
    }

    pub fn as_slice(&self) -> &[ParsedQuestion] {
        &self.questions
    }

    /// 用户编辑：整体替换同 ID 的题目，返回旧题目
    ///
    /// 新题目已在构造时完成校验，因此替换是原子的
    pub fn replace(&mut self, question: ParsedQuestion) -> Result<ParsedQuestion, QuestionError> {
        let slot = self
            .questions
            .iter_mut()
            .find(|q| q.id() == question.id())
            .ok_or(QuestionError::NotFound { id: question.id() })?;
        Ok(std::mem::replace(slot, question))
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a ParsedQuestion;
    type IntoIter = std::slice::Iter<'a, ParsedQuestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}
