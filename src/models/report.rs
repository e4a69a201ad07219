//! 成绩报告模型
//!
//! 评分时一次性生成的只读快照

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::question::OptionLabel;
use crate::session::{FinishReason, QuizMode};

/// 单题结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Correct,
    Incorrect,
    Unanswered,
}

/// 单题明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub question_id: u32,
    /// 所选答案；`None` 表示未作答
    pub selected: Option<OptionLabel>,
    /// 正确答案；`None` 表示该题没有可核实的答案
    pub correct: Option<OptionLabel>,
    pub elapsed: Duration,
    pub status: AnswerStatus,
    pub marked_for_review: bool,
}

impl BreakdownRow {
    /// 所选答案的展示文本
    pub fn selected_display(&self) -> String {
        self.selected
            .map(|label| label.to_string())
            .unwrap_or_else(|| "unanswered".to_string())
    }
}

/// 成绩报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub correct_count: usize,
    pub incorrect_count: usize,
    pub unanswered_count: usize,
    /// 没有可核实答案的题目数（仅展示）
    pub unverified_count: usize,
    pub marked_count: usize,
    pub accuracy_percent: f64,
    pub total_elapsed: Duration,
    pub mode: QuizMode,
    pub finish_reason: Option<FinishReason>,
    pub started_at: Option<DateTime<Local>>,
    pub breakdown: Vec<BreakdownRow>,
}

impl ScoreReport {
    pub fn total_questions(&self) -> usize {
        self.breakdown.len()
    }

    pub fn total_elapsed_secs(&self) -> f64 {
        self.total_elapsed.as_secs_f64()
    }
}
