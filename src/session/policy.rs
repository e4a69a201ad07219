//! 答题模式策略
//!
//! 状态机本身与模式无关；练习模式与考试模式只在策略对象上不同：
//! 是否有时间预算、答完最后一题时是否自动交卷。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// 答题模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    #[default]
    Practice,
    Exam,
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Practice => write!(f, "练习模式"),
            QuizMode::Exam => write!(f, "考试模式"),
        }
    }
}

impl FromStr for QuizMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "practice" => Ok(QuizMode::Practice),
            "exam" => Ok(QuizMode::Exam),
            _ => Err(ConfigError::EnvVarParseFailed {
                var_name: "QUIZ_MODE".to_string(),
                value: s.to_string(),
                expected_type: "practice | exam".to_string(),
            }),
        }
    }
}

/// 会话策略
pub trait SessionPolicy: fmt::Debug + Send + Sync {
    fn mode(&self) -> QuizMode;

    /// 时间预算；`None` 表示不限时
    fn duration_budget(&self) -> Option<Duration>;

    /// 在最后一题上作答并前进时是否直接交卷
    fn finish_on_last_answer(&self) -> bool;
}

/// 练习模式：不限时，答完最后一题即完成
#[derive(Debug, Default, Clone, Copy)]
pub struct PracticePolicy;

impl SessionPolicy for PracticePolicy {
    fn mode(&self) -> QuizMode {
        QuizMode::Practice
    }

    fn duration_budget(&self) -> Option<Duration> {
        None
    }

    fn finish_on_last_answer(&self) -> bool {
        true
    }
}

/// 考试模式：限时，到时自动交卷，其余情况必须显式交卷
#[derive(Debug, Clone, Copy)]
pub struct ExamPolicy {
    budget: Duration,
}

impl ExamPolicy {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// 按每题固定用时计算总预算
    pub fn paced(question_count: usize, seconds_per_question: u64) -> Self {
        Self::new(Duration::from_secs(
            question_count as u64 * seconds_per_question,
        ))
    }
}

impl SessionPolicy for ExamPolicy {
    fn mode(&self) -> QuizMode {
        QuizMode::Exam
    }

    fn duration_budget(&self) -> Option<Duration> {
        Some(self.budget)
    }

    fn finish_on_last_answer(&self) -> bool {
        false
    }
}
