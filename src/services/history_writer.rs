//! 答题记录写入服务 - 业务能力层
//!
//! 只负责"追加一条答题记录"能力，不关心流程

use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::report::ScoreReport;
use crate::session::{FinishReason, QuizMode};

/// 一条答题记录（JSON Lines 中的一行）
#[derive(Debug, Serialize)]
struct HistoryEntry<'a> {
    recorded_at: String,
    source: &'a str,
    mode: QuizMode,
    finish_reason: Option<FinishReason>,
    total_questions: usize,
    correct: usize,
    incorrect: usize,
    unanswered: usize,
    accuracy_percent: f64,
    total_elapsed_secs: f64,
}

/// 答题记录写入服务
///
/// 职责：
/// - 每次答题结束后追加一行记录
/// - 只追加，不读取、不修改已有记录
pub struct HistoryWriter {
    history_file_path: PathBuf,
}

impl HistoryWriter {
    /// 使用默认文件创建
    pub fn new() -> Self {
        Self::with_path("quiz_history.jsonl")
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            history_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.history_file_path
    }

    /// 追加一条答题记录
    ///
    /// # 参数
    /// - `source`: 题目来源（文件名）
    /// - `report`: 成绩报告
    pub async fn append(&self, source: &str, report: &ScoreReport) -> AppResult<()> {
        let entry = HistoryEntry {
            recorded_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source,
            mode: report.mode,
            finish_reason: report.finish_reason,
            total_questions: report.total_questions(),
            correct: report.correct_count,
            incorrect: report.incorrect_count,
            unanswered: report.unanswered_count,
            accuracy_percent: report.accuracy_percent,
            total_elapsed_secs: report.total_elapsed_secs(),
        };

        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        debug!(
            "写入答题记录: {} | 正确 {}/{}",
            self.history_file_path.display(),
            entry.correct,
            entry.total_questions
        );

        let path_str = self.history_file_path.display().to_string();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_file_path)
            .await
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;
        file.flush()
            .await
            .map_err(|e| AppError::file_write_failed(&path_str, e))?;

        Ok(())
    }
}

impl Default for HistoryWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{AnswerStatus, BreakdownRow};
    use std::time::Duration;

    fn report() -> ScoreReport {
        ScoreReport {
            correct_count: 1,
            incorrect_count: 0,
            unanswered_count: 1,
            unverified_count: 0,
            marked_count: 0,
            accuracy_percent: 50.0,
            total_elapsed: Duration::from_secs(42),
            mode: QuizMode::Exam,
            finish_reason: Some(FinishReason::TimeExpired),
            started_at: None,
            breakdown: vec![
                BreakdownRow {
                    question_id: 1,
                    selected: None,
                    correct: None,
                    elapsed: Duration::from_secs(40),
                    status: AnswerStatus::Correct,
                    marked_for_review: false,
                },
                BreakdownRow {
                    question_id: 2,
                    selected: None,
                    correct: None,
                    elapsed: Duration::from_secs(2),
                    status: AnswerStatus::Unanswered,
                    marked_for_review: false,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_append_only_history() {
        let dir = tempfile::tempdir().unwrap();
        let writer = HistoryWriter::with_path(dir.path().join("history.jsonl"));

        writer.append("exam.txt", &report()).await.unwrap();
        writer.append("exam.txt", &report()).await.unwrap();

        let content = tokio::fs::read_to_string(writer.path()).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["mode"], "exam");
        assert_eq!(first["finish_reason"], "time_expired");
        assert_eq!(first["total_questions"], 2);
        assert_eq!(first["total_elapsed_secs"], 42.0);
    }
}
