//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一次完整的答题流程和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、创建评分和记录服务
//! 2. **加载题目**：`.toml` 题库直接加载，其他文件走文本提取流程
//! 3. **保存题库**：按配置把提取结果保存为 TOML
//! 4. **答题**：按配置的模式构建会话，委托 console 驱动
//! 5. **收尾**：评分、输出成绩、追加答题记录
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单道题的解析细节
//! - **向下委托**：提取委托 workflow，答题委托 console

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::models::question::QuestionSet;
use crate::models::{load_question_set, load_text_file, save_question_set, PlainTextDocument};
use crate::models::loaders::read_raw_text;
use crate::orchestrator::console::{self, ConsoleOutcome, ConsoleView};
use crate::services::{HistoryWriter, ScoreEngine};
use crate::session::{
    Clock, ExamPolicy, PracticePolicy, QuizMode, QuizSession, SessionPolicy, SystemClock,
};
use crate::utils::logging::{log_extraction_summary, log_final_report, log_startup};
use crate::workflow::ExtractionPipeline;

/// 应用主结构
pub struct App {
    config: Config,
    score_engine: ScoreEngine,
    history: HistoryWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config.input_path, config.mode);

        let history = HistoryWriter::with_path(config.history_file.clone());

        Ok(Self {
            config,
            score_engine: ScoreEngine::new(),
            history,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let questions = load_questions(&self.config).await?;

        if questions.is_empty() {
            warn!("⚠️ 没有提取到任何题目，程序结束");
            return Ok(());
        }

        if let Some(bank_path) = &self.config.bank_output {
            save_question_set(bank_path, &questions)
                .await
                .with_context(|| format!("保存题库失败: {}", bank_path.display()))?;
            info!("💾 题库已保存至: {}", bank_path.display());
        }

        let mut session = build_session(&self.config, Arc::new(questions), Arc::new(SystemClock))?;
        session.start()?;

        let stdin = BufReader::new(tokio::io::stdin());
        let view = ConsoleView {
            show_explanation: self.config.show_explanation,
        };
        match console::run_session(&mut session, stdin, view).await? {
            ConsoleOutcome::Finished => {}
            ConsoleOutcome::Abandoned => {
                info!("👋 已放弃本次答题，不计分");
                return Ok(());
            }
        }

        let report = self.score_engine.score(&session)?;
        log_final_report(&report);

        let source = self.config.input_path.display().to_string();
        match self.history.append(&source, &report).await {
            Ok(_) => info!("\n答题记录已保存至: {}", self.history.path().display()),
            Err(e) => warn!("⚠️ 答题记录写入失败: {}", e),
        }

        Ok(())
    }
}

/// 加载题目集合
///
/// `.toml` 文件按题库加载；其他文件按纯文本提取
pub async fn load_questions(config: &Config) -> Result<QuestionSet> {
    let path = config.input_path.as_path();
    info!("\n📁 正在加载题目: {}", path.display());

    if is_question_bank(path) {
        let questions = load_question_set(path)
            .await
            .with_context(|| format!("无法加载题库: {}", path.display()))?;
        return Ok(questions);
    }

    let content = load_text_file(path)
        .await
        .with_context(|| format!("无法读取题目文件: {}", path.display()))?;
    let raw = read_raw_text(&PlainTextDocument::new(content));

    let mut pipeline = ExtractionPipeline::new(config.parser_options());
    let (questions, stats) = pipeline.extract_with_stats(&raw);
    log_extraction_summary(&stats);

    Ok(questions)
}

/// 按配置构建答题会话
pub fn build_session(
    config: &Config,
    questions: Arc<QuestionSet>,
    clock: Arc<dyn Clock>,
) -> Result<QuizSession, SessionError> {
    let policy: Box<dyn SessionPolicy> = match config.mode {
        QuizMode::Practice => Box::new(PracticePolicy),
        QuizMode::Exam => match config.exam_duration_secs {
            Some(_) => Box::new(ExamPolicy::new(config.exam_budget(questions.len()))),
            None => Box::new(ExamPolicy::paced(
                questions.len(),
                config.exam_seconds_per_question,
            )),
        },
    };
    QuizSession::new(questions, policy, clock)
}

fn is_question_bank(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ManualClock;
    use std::time::Duration;

    const EXAM: &str = "Q1. What is 2+2?\nA) 3\nB) 4\nC) 5\nAnswer: B\n\nQ2. Capital of France?\nA) Paris\nB) Rome\nAnswer: A\n";

    #[test]
    fn test_question_bank_detection() {
        assert!(is_question_bank(Path::new("bank.toml")));
        assert!(is_question_bank(Path::new("BANK.TOML")));
        assert!(!is_question_bank(Path::new("exam.txt")));
        assert!(!is_question_bank(Path::new("exam")));
    }

    #[tokio::test]
    async fn test_load_questions_from_text_and_bank() {
        let dir = tempfile::tempdir().unwrap();
        let text_path = dir.path().join("exam.txt");
        tokio::fs::write(&text_path, EXAM).await.unwrap();

        let config = Config {
            input_path: text_path,
            ..Config::default()
        };
        let questions = load_questions(&config).await.unwrap();
        assert_eq!(questions.len(), 2);

        let bank_path = dir.path().join("bank.toml");
        save_question_set(&bank_path, &questions).await.unwrap();
        let config = Config {
            input_path: bank_path,
            ..Config::default()
        };
        let reloaded = load_questions(&config).await.unwrap();
        assert_eq!(reloaded, questions);
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            input_path: dir.path().join("nope.txt"),
            ..Config::default()
        };
        assert!(load_questions(&config).await.is_err());
    }

    #[test]
    fn test_build_session_uses_configured_mode() {
        let mut pipeline = ExtractionPipeline::default();
        let questions = Arc::new(pipeline.extract(EXAM));
        let clock = Arc::new(ManualClock::new());

        let practice = build_session(&Config::default(), questions.clone(), clock.clone()).unwrap();
        assert_eq!(practice.mode(), QuizMode::Practice);
        assert_eq!(practice.duration_budget(), None);

        let exam_config = Config {
            mode: QuizMode::Exam,
            ..Config::default()
        };
        let exam = build_session(&exam_config, questions.clone(), clock.clone()).unwrap();
        assert_eq!(exam.duration_budget(), Some(Duration::from_secs(60)));

        let fixed_config = Config {
            mode: QuizMode::Exam,
            exam_duration_secs: Some(10),
            ..Config::default()
        };
        let fixed = build_session(&fixed_config, questions, clock).unwrap();
        assert_eq!(fixed.duration_budget(), Some(Duration::from_secs(10)));
    }
}
