//! 答题会话层
//!
//! 一个会话 = 一个用户 + 一份题目集合 + 一次作答过程。
//! 会话是显式传递的值，所有操作返回 `Result`，不存在全局状态。
//!
//! ```text
//! NotStarted ──start()──▶ InProgress ──submit() / 超时 / 答完最后一题──▶ Finished
//! ```

pub mod clock;
pub mod policy;
pub mod quiz_session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use policy::{ExamPolicy, PracticePolicy, QuizMode, SessionPolicy};
pub use quiz_session::{FinishReason, NavOutcome, QuizSession, SessionStatus};
