//! 答题会话状态机
//!
//! 每个操作开始时读取一次时钟，先检查考试时间是否耗尽（耗尽则自动交卷），
//! 再校验状态和参数，全部通过后才修改会话。失败的操作不会改变任何状态。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::models::question::{OptionLabel, ParsedQuestion, QuestionSet};
use crate::session::clock::Clock;
use crate::session::policy::{QuizMode, SessionPolicy};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// 结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// 显式交卷
    Submitted,
    /// 考试时间耗尽，自动交卷
    TimeExpired,
    /// 在最后一题上作答并前进（仅练习模式）
    CompletedLastQuestion,
}

/// 导航结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved,
    /// 已在边界，未移动
    Stayed,
    Finished,
}

/// 答题会话
pub struct QuizSession {
    questions: Arc<QuestionSet>,
    policy: Box<dyn SessionPolicy>,
    clock: Arc<dyn Clock>,
    status: SessionStatus,
    current_index: usize,
    answers: HashMap<u32, OptionLabel>,
    attempts: HashMap<u32, u32>,
    elapsed: HashMap<u32, Duration>,
    marked: BTreeSet<usize>,
    started_at: Option<Instant>,
    started_at_wall: Option<DateTime<Local>>,
    entered_at: Option<Instant>,
    finished_at: Option<Instant>,
    finish_reason: Option<FinishReason>,
}

impl std::fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSession")
            .field("mode", &self.policy.mode())
            .field("status", &self.status)
            .field("current_index", &self.current_index)
            .field("questions", &self.questions.len())
            .field("answers", &self.answers)
            .field("marked", &self.marked)
            .field("finish_reason", &self.finish_reason)
            .finish()
    }
}

impl QuizSession {
    /// 创建会话（状态为 NotStarted）
    ///
    /// 题目集合为空时无法创建会话
    pub fn new(
        questions: Arc<QuestionSet>,
        policy: Box<dyn SessionPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet);
        }

        let elapsed = questions
            .iter()
            .map(|q| (q.id(), Duration::ZERO))
            .collect();

        Ok(Self {
            questions,
            policy,
            clock,
            status: SessionStatus::NotStarted,
            current_index: 0,
            answers: HashMap::new(),
            attempts: HashMap::new(),
            elapsed,
            marked: BTreeSet::new(),
            started_at: None,
            started_at_wall: None,
            entered_at: None,
            finished_at: None,
            finish_reason: None,
        })
    }

    // ========== 状态迁移 ==========

    /// 开始答题
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::NotStarted {
            return Err(SessionError::InvalidState {
                operation: "start",
                status: self.status,
            });
        }

        let now = self.clock.now();
        self.started_at = Some(now);
        self.started_at_wall = Some(self.clock.wall_now());
        self.entered_at = Some(now);
        self.current_index = 0;
        self.status = SessionStatus::InProgress;

        info!(
            "🚀 开始答题: {} | 共 {} 题 | 时间预算: {:?}",
            self.policy.mode(),
            self.questions.len(),
            self.policy.duration_budget()
        );
        Ok(())
    }

    /// 为当前题目选择答案（可重复选择，后选覆盖先选）
    pub fn select_answer(&mut self, label: OptionLabel) -> Result<(), SessionError> {
        self.begin_action("select_answer")?;

        let question_id = self.current().id();
        if !self.current().options().contains(label) {
            return Err(SessionError::InvalidLabel { label, question_id });
        }

        self.answers.insert(question_id, label);
        *self.attempts.entry(question_id).or_insert(0) += 1;
        debug!("题目 {} 选择了 {}", question_id, label);
        Ok(())
    }

    /// 选择答案后前进到下一题
    ///
    /// 在最后一题上作答时，按策略决定交卷（练习模式）或停留（考试模式）
    pub fn answer_and_advance(&mut self, label: OptionLabel) -> Result<NavOutcome, SessionError> {
        self.select_answer(label)?;
        let now = self.begin_action("answer_and_advance")?;

        if self.current_index + 1 < self.questions.len() {
            self.move_to(self.current_index + 1, now);
            Ok(NavOutcome::Moved)
        } else if self.policy.finish_on_last_answer() {
            self.finish(now, FinishReason::CompletedLastQuestion);
            Ok(NavOutcome::Finished)
        } else {
            Ok(NavOutcome::Stayed)
        }
    }

    /// 跳转到指定题目（0-based）
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        let now = self.begin_action("go_to")?;
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.move_to(index, now);
        Ok(())
    }

    /// 下一题；在最后一题时保持不动
    pub fn next(&mut self) -> Result<NavOutcome, SessionError> {
        let now = self.begin_action("next")?;

        if self.current_index + 1 >= self.questions.len() {
            return Ok(NavOutcome::Stayed);
        }
        self.move_to(self.current_index + 1, now);
        Ok(NavOutcome::Moved)
    }

    /// 上一题；在第一题时保持不动
    pub fn previous(&mut self) -> Result<NavOutcome, SessionError> {
        let now = self.begin_action("previous")?;

        if self.current_index == 0 {
            return Ok(NavOutcome::Stayed);
        }
        self.move_to(self.current_index - 1, now);
        Ok(NavOutcome::Moved)
    }

    /// 切换复查标记，返回切换后是否处于标记状态
    pub fn toggle_mark(&mut self, index: usize) -> Result<bool, SessionError> {
        self.begin_action("toggle_mark")?;
        if index >= self.questions.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }

        if self.marked.remove(&index) {
            Ok(false)
        } else {
            self.marked.insert(index);
            Ok(true)
        }
    }

    /// 交卷
    pub fn submit(&mut self) -> Result<(), SessionError> {
        let now = self.begin_action("submit")?;
        self.finish(now, FinishReason::Submitted);
        Ok(())
    }

    /// 检查考试时间，耗尽则自动交卷
    ///
    /// 返回本次调用是否触发了自动交卷；已结束的会话总是返回 `false`
    pub fn poll_deadline(&mut self) -> bool {
        let now = self.clock.now();
        self.poll_at(now)
    }

    // ========== 只读查询 ==========

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn mode(&self) -> QuizMode {
        self.policy.mode()
    }

    pub fn duration_budget(&self) -> Option<Duration> {
        self.policy.duration_budget()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &ParsedQuestion {
        self.current()
    }

    pub fn answer_for(&self, question_id: u32) -> Option<OptionLabel> {
        self.answers.get(&question_id).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// 选择次数（仅展示用，不参与评分）
    pub fn attempts_for(&self, question_id: u32) -> u32 {
        self.attempts.get(&question_id).copied().unwrap_or(0)
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.contains(&index)
    }

    pub fn marked(&self) -> &BTreeSet<usize> {
        &self.marked
    }

    /// 某题已累计的用时（不含当前题目正在进行的部分）
    pub fn elapsed_for(&self, question_id: u32) -> Duration {
        self.elapsed.get(&question_id).copied().unwrap_or_default()
    }

    /// 当前题目本次进入后的用时
    pub fn current_question_elapsed(&self) -> Duration {
        match (self.status, self.entered_at) {
            (SessionStatus::InProgress, Some(entered)) => {
                self.clock.now().saturating_duration_since(entered)
            }
            _ => Duration::ZERO,
        }
    }

    /// 总用时：已累计部分加上当前题目正在进行的部分
    pub fn total_elapsed(&self) -> Duration {
        self.elapsed.values().sum::<Duration>() + self.current_question_elapsed()
    }

    /// 考试剩余时间；练习模式返回 `None`
    pub fn remaining(&self) -> Option<Duration> {
        let budget = self.policy.duration_budget()?;
        let used = match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => self.clock.now().saturating_duration_since(start),
            _ => Duration::ZERO,
        };
        Some(budget.saturating_sub(used))
    }

    /// 考试时间进度（0.0–1.0）；练习模式返回 `None`
    pub fn time_progress(&self) -> Option<f64> {
        let budget = self.policy.duration_budget()?;
        let remaining = self.remaining()?;
        if budget.is_zero() {
            return Some(1.0);
        }
        let used = budget.saturating_sub(remaining);
        Some((used.as_secs_f64() / budget.as_secs_f64()).min(1.0))
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at_wall
    }

    // ========== 内部实现 ==========

    fn current(&self) -> &ParsedQuestion {
        // current_index 始终在 [0, len) 内，且题目集合非空
        &self.questions.as_slice()[self.current_index]
    }

    /// 读取时间、检查超时、校验状态
    fn begin_action(&mut self, operation: &'static str) -> Result<Instant, SessionError> {
        let now = self.clock.now();
        self.poll_at(now);

        match self.status {
            SessionStatus::InProgress => Ok(now),
            status => Err(SessionError::InvalidState { operation, status }),
        }
    }

    fn deadline(&self) -> Option<Instant> {
        Some(self.started_at? + self.policy.duration_budget()?)
    }

    fn poll_at(&mut self, now: Instant) -> bool {
        if self.status != SessionStatus::InProgress {
            return false;
        }
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                info!("⏰ 考试时间已用完，自动交卷");
                // 超出截止时间的部分不计入用时
                self.finish(deadline, FinishReason::TimeExpired);
                true
            }
            _ => false,
        }
    }

    fn move_to(&mut self, index: usize, now: Instant) {
        self.flush(now);
        self.current_index = index;
        self.entered_at = Some(now);
    }

    /// 把当前题目本次进入以来的用时累加到该题
    fn flush(&mut self, at: Instant) {
        if let Some(entered) = self.entered_at {
            let id = self.current().id();
            let delta = at.saturating_duration_since(entered);
            *self.elapsed.entry(id).or_default() += delta;
            self.entered_at = Some(at);
        }
    }

    fn finish(&mut self, at: Instant, reason: FinishReason) {
        self.flush(at);
        self.entered_at = None;
        self.finished_at = Some(at);
        self.status = SessionStatus::Finished;
        self.finish_reason = Some(reason);

        info!(
            "✅ 答题结束 ({:?}): 已作答 {}/{}",
            reason,
            self.answers.len(),
            self.questions.len()
        );
    }
}
