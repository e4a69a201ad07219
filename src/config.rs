use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::services::question_parser::{MissingAnswerPolicy, MissingOptionsPolicy, ParserOptions};
use crate::session::QuizMode;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 题目文本文件（`.txt`）或题库文件（`.toml`）
    pub input_path: PathBuf,
    /// 答题模式
    pub mode: QuizMode,
    /// 考试模式下每题的用时（秒）
    pub exam_seconds_per_question: u64,
    /// 考试总时长（秒），设置后覆盖按题计算的时长
    pub exam_duration_secs: Option<u64>,
    // --- 解析兜底策略 ---
    pub missing_answer_policy: MissingAnswerPolicy,
    pub missing_options_policy: MissingOptionsPolicy,
    /// 随机答案的种子
    pub answer_seed: Option<u64>,
    /// 答题记录文件
    pub history_file: PathBuf,
    /// 提取后保存题库的路径
    pub bank_output: Option<PathBuf>,
    /// 答题时是否显示题目解析（控制台可用 `x` 切换）
    pub show_explanation: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("questions.txt"),
            mode: QuizMode::Practice,
            exam_seconds_per_question: 30,
            exam_duration_secs: None,
            missing_answer_policy: MissingAnswerPolicy::default(),
            missing_options_policy: MissingOptionsPolicy::default(),
            answer_seed: None,
            history_file: PathBuf::from("quiz_history.jsonl"),
            bank_output: None,
            show_explanation: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_path: std::env::var("QUIZ_INPUT_PATH").map(PathBuf::from).unwrap_or(default.input_path),
            mode: parse_or_warn("QUIZ_MODE", default.mode),
            exam_seconds_per_question: std::env::var("QUIZ_EXAM_SECONDS_PER_QUESTION").ok().and_then(|v| v.parse().ok()).unwrap_or(default.exam_seconds_per_question),
            exam_duration_secs: std::env::var("QUIZ_EXAM_DURATION_SECS").ok().and_then(|v| v.parse().ok()),
            missing_answer_policy: parse_or_warn("QUIZ_MISSING_ANSWER", default.missing_answer_policy),
            missing_options_policy: parse_or_warn("QUIZ_MISSING_OPTIONS", default.missing_options_policy),
            answer_seed: std::env::var("QUIZ_ANSWER_SEED").ok().and_then(|v| v.parse().ok()),
            history_file: std::env::var("QUIZ_HISTORY_FILE").map(PathBuf::from).unwrap_or(default.history_file),
            bank_output: std::env::var("QUIZ_BANK_OUTPUT").ok().map(PathBuf::from),
            show_explanation: std::env::var("QUIZ_SHOW_EXPLANATION").ok().and_then(|v| v.parse().ok()).unwrap_or(default.show_explanation),
            verbose_logging: Self::verbose_from_env(),
        }
    }

    /// 只读取 `VERBOSE_LOGGING`，供日志初始化在加载完整配置之前使用
    pub fn verbose_from_env() -> bool {
        std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(false)
    }

    /// 解析器选项
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            missing_answer: self.missing_answer_policy,
            missing_options: self.missing_options_policy,
            seed: self.answer_seed,
        }
    }

    /// 考试总时长
    pub fn exam_budget(&self, question_count: usize) -> Duration {
        match self.exam_duration_secs {
            Some(secs) => Duration::from_secs(secs),
            None => Duration::from_secs(question_count as u64 * self.exam_seconds_per_question),
        }
    }
}

/// 读取并解析环境变量，解析失败时回退到默认值并给出警告
fn parse_or_warn<T>(var_name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match std::env::var(var_name) {
        Ok(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("⚠️ {} 无法解析，使用默认值 {:?}: {}", var_name, default, e);
                default
            }
        },
        Err(_) => default,
    }
}
