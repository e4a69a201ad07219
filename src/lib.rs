//! # PDF Quiz
//!
//! 从试卷文本中提取选择题，并以练习或考试模式作答、评分
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 题目、选项、答案和成绩报告的强类型定义
//! - `models/loaders` - 文本来源（`TextSource`）和 TOML 题库读写
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只做一件事
//! - `TextSegmenter` - 把原始文本切分为题目块
//! - `QuestionParser` - 把单个题目块解析成选择题
//! - `ScoreEngine` - 为已结束的会话评分
//! - `HistoryWriter` - 追加答题记录
//!
//! ### ③ 流程层（Workflow / Session）
//! - `workflow/` - `ExtractionPipeline`：切分 → 解析 → 分配ID
//! - `session/` - `QuizSession` 状态机，模式差异由 `SessionPolicy` 表达
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 加载、提取、答题、评分、记录
//! - `orchestrator/console` - 控制台交互
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{OptionLabel, ParsedQuestion, QuestionSet, ScoreReport};
pub use orchestrator::App;
pub use services::ScoreEngine;
pub use session::{ExamPolicy, PracticePolicy, QuizMode, QuizSession};
pub use workflow::ExtractionPipeline;
