//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次答题的完整调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 加载题目（题库或文本提取）
//! - 按配置构建会话，结束后评分并写入记录
//!
//! ### `console` - 控制台答题
//! - 把输入行翻译成会话操作
//! - 展示当前题目、难度和剩余时间，练习模式下可切换显示解析
//! - 考试模式下按时检查并自动交卷
//!
//! ## 层次关系
//!
//! ```text
//! app (加载 → 提取 → 会话 → 评分 → 记录)
//!     ↓
//! console (驱动单个 QuizSession)
//!     ↓
//! workflow::ExtractionPipeline / session::QuizSession
//!     ↓
//! services (能力层：segment / parse / score / history)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：app 管流程，console 管交互
//! 2. **向下依赖**：编排层 → workflow / session → services → models
//! 3. **无业务逻辑**：只做调度和输出，不做解析或评分判断

pub mod app;
pub mod console;

// 重新导出主要类型
pub use app::{build_session, load_questions, App};
pub use console::{apply_command, run_session, Command, ConsoleOutcome, ConsoleView, Step};
