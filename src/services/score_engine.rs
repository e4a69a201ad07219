//! 评分服务 - 业务能力层
//!
//! 只负责把已结束的会话变成成绩报告，不修改会话

use std::time::Duration;
use tracing::debug;

use crate::error::SessionError;
use crate::models::question::AnswerKey;
use crate::models::report::{AnswerStatus, BreakdownRow, ScoreReport};
use crate::session::{QuizSession, SessionStatus};

/// 评分服务
///
/// 没有可核实答案的题目：作答了记为错误（无法给分），未作答记为未作答，
/// 同时计入 `unverified_count` 供展示
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreEngine;

impl ScoreEngine {
    pub fn new() -> Self {
        Self
    }

    /// 为已结束的会话生成成绩报告
    pub fn score(&self, session: &QuizSession) -> Result<ScoreReport, SessionError> {
        if session.status() != SessionStatus::Finished {
            return Err(SessionError::NotFinished {
                status: session.status(),
            });
        }

        let mut correct_count = 0;
        let mut incorrect_count = 0;
        let mut unanswered_count = 0;
        let mut unverified_count = 0;
        let mut total_elapsed = Duration::ZERO;
        let mut breakdown = Vec::with_capacity(session.len());

        for (index, question) in session.questions().iter().enumerate() {
            let selected = session.answer_for(question.id());
            let correct = question.correct_label();
            let elapsed = session.elapsed_for(question.id());

            if question.answer() == AnswerKey::Unverified {
                unverified_count += 1;
            }

            let status = match (selected, correct) {
                (None, _) => AnswerStatus::Unanswered,
                (Some(chosen), Some(key)) if chosen == key => AnswerStatus::Correct,
                (Some(_), _) => AnswerStatus::Incorrect,
            };
            match status {
                AnswerStatus::Correct => correct_count += 1,
                AnswerStatus::Incorrect => incorrect_count += 1,
                AnswerStatus::Unanswered => unanswered_count += 1,
            }

            total_elapsed += elapsed;
            breakdown.push(BreakdownRow {
                question_id: question.id(),
                selected,
                correct,
                elapsed,
                status,
                marked_for_review: session.is_marked(index),
            });
        }

        let total = breakdown.len();
        let accuracy_percent = if total == 0 {
            0.0
        } else {
            correct_count as f64 / total as f64 * 100.0
        };

        debug!(
            "评分完成: 正确 {}, 错误 {}, 未作答 {}, 正确率 {:.1}%",
            correct_count, incorrect_count, unanswered_count, accuracy_percent
        );

        Ok(ScoreReport {
            correct_count,
            incorrect_count,
            unanswered_count,
            unverified_count,
            marked_count: session.marked().len(),
            accuracy_percent,
            total_elapsed,
            mode: session.mode(),
            finish_reason: session.finish_reason(),
            started_at: session.started_at(),
            breakdown,
        })
    }
}
