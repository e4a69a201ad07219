//! 控制台答题 - 编排层
//!
//! ## 职责
//!
//! 把用户输入的一行文本翻译成会话操作，并在终端上展示当前题目。
//! 本模块不做任何评分或解析，所有状态都由 `QuizSession` 持有。
//!
//! ## 命令
//!
//! | 输入 | 操作 |
//! |---|---|
//! | `a`..`e` | 作答并进入下一题 |
//! | `n` / `p` | 下一题 / 上一题 |
//! | `g 3` | 跳转到第 3 题 |
//! | `m` / `m 3` | 切换当前题 / 第 3 题的复查标记 |
//! | `x` | 显示 / 隐藏题目解析（仅练习模式） |
//! | `s` | 交卷 |
//! | `q` | 放弃本次答题 |
//! | `h` | 帮助 |

use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::error::SessionError;
use crate::models::question::OptionLabel;
use crate::session::{NavOutcome, QuizMode, QuizSession, SessionStatus};

/// 考试模式下检查时间的间隔
const DEADLINE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 控制台命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Answer(OptionLabel),
    Next,
    Previous,
    /// 跳转，0-based
    GoTo(usize),
    /// 切换复查标记；`None` 表示当前题
    Mark(Option<usize>),
    ToggleExplanation,
    Submit,
    Quit,
    Help,
}

impl Command {
    /// 解析一行输入；无法识别时返回 `None`
    ///
    /// 题号按用户习惯从 1 开始
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let mut parts = input.split_whitespace();
        let head = parts.next()?.to_ascii_lowercase();
        let arg = parts.next();
        if parts.next().is_some() {
            return None;
        }

        let position = |raw: Option<&str>| -> Option<Option<usize>> {
            match raw {
                None => Some(None),
                Some(raw) => match raw.parse::<usize>() {
                    Ok(n) if n >= 1 => Some(Some(n - 1)),
                    _ => None,
                },
            }
        };

        match (head.as_str(), arg) {
            ("n" | "next", None) => Some(Command::Next),
            ("p" | "prev" | "previous", None) => Some(Command::Previous),
            ("s" | "submit", None) => Some(Command::Submit),
            ("q" | "quit", None) => Some(Command::Quit),
            ("h" | "help" | "?", None) => Some(Command::Help),
            ("x" | "explain", None) => Some(Command::ToggleExplanation),
            ("g" | "go", Some(_)) => position(arg)?.map(Command::GoTo),
            ("m" | "mark", _) => position(arg).map(Command::Mark),
            (letter, None) if letter.chars().count() == 1 => letter
                .chars()
                .next()
                .and_then(OptionLabel::from_char)
                .map(Command::Answer),
            _ => None,
        }
    }
}

/// 控制台显示选项，不影响会话状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleView {
    pub show_explanation: bool,
}

/// 一次命令执行后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// 用户放弃答题，会话不再评分
    Abandon,
}

/// 控制台答题的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Finished,
    Abandoned,
}

/// 对会话执行一条命令
///
/// 会话错误原样返回，会话状态保持不变
pub fn apply_command(
    session: &mut QuizSession,
    view: &mut ConsoleView,
    command: Command,
) -> Result<Step, SessionError> {
    match command {
        Command::Answer(label) => {
            if session.answer_and_advance(label)? == NavOutcome::Stayed {
                println!("已作答最后一题，输入 s 交卷");
            }
        }
        Command::Next => {
            if session.next()? == NavOutcome::Stayed {
                println!("已经是最后一题，输入 s 交卷");
            }
        }
        Command::Previous => {
            if session.previous()? == NavOutcome::Stayed {
                println!("已经是第一题");
            }
        }
        Command::GoTo(index) => session.go_to(index)?,
        Command::Mark(index) => {
            let index = index.unwrap_or_else(|| session.current_index());
            let marked = session.toggle_mark(index)?;
            println!(
                "第 {} 题{}复查标记",
                index + 1,
                if marked { "已加入" } else { "已取消" }
            );
        }
        Command::ToggleExplanation => {
            view.show_explanation = !view.show_explanation;
            if session.mode() == QuizMode::Exam {
                println!("考试模式下不显示解析");
            } else {
                println!("解析已{}", if view.show_explanation { "显示" } else { "隐藏" });
            }
        }
        Command::Submit => session.submit()?,
        Command::Quit => return Ok(Step::Abandon),
        Command::Help => print_help(),
    }
    Ok(Step::Continue)
}

/// 在控制台上运行一次已开始的答题会话
///
/// 输入结束（EOF）视为放弃；考试模式下即使没有输入也会按时自动交卷
pub async fn run_session<R>(
    session: &mut QuizSession,
    input: R,
    mut view: ConsoleView,
) -> Result<ConsoleOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(DEADLINE_POLL_INTERVAL);
    let timed = session.duration_budget().is_some();

    print_help();
    render(session, &view);

    loop {
        if session.status() == SessionStatus::Finished {
            return Ok(ConsoleOutcome::Finished);
        }

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("输入已结束，放弃本次答题");
                    return Ok(ConsoleOutcome::Abandoned);
                };
                if line.trim().is_empty() {
                    continue;
                }

                let Some(command) = Command::parse(&line) else {
                    println!("无法识别的命令: {}（输入 h 查看帮助）", line.trim());
                    continue;
                };

                match apply_command(session, &mut view, command) {
                    Ok(Step::Abandon) => return Ok(ConsoleOutcome::Abandoned),
                    Ok(Step::Continue) => {}
                    Err(e) => {
                        warn!("⚠️ 操作未执行: {}", e);
                        println!("操作未执行: {}", e);
                    }
                }

                if session.status() == SessionStatus::InProgress {
                    render(session, &view);
                }
            }
            _ = ticker.tick(), if timed => {
                if session.poll_deadline() {
                    println!("\n⏰ 时间到，已自动交卷");
                }
            }
        }
    }
}

/// 展示当前题目
fn render(session: &QuizSession, view: &ConsoleView) {
    let question = session.current_question();
    let selected = session.answer_for(question.id());

    println!("\n{}", "─".repeat(60));
    print!("第 {}/{} 题", session.current_index() + 1, session.len());
    if session.is_marked(session.current_index()) {
        print!(" 🔖");
    }
    if let Some(remaining) = session.remaining() {
        print!(" | 剩余 {}s", remaining.as_secs());
    }
    println!(" | 已答 {}/{}", session.answered_count(), session.len());
    println!("[{}] {}", question.difficulty(), question.text());

    for option in question.options() {
        let pointer = if selected == Some(option.label) { "▶" } else { " " };
        println!("{} {}) {}", pointer, option.label, option.text);
    }

    if let Some(explanation) = explanation_for(session, view) {
        println!("💡 解析: {}", explanation);
    }
}

/// 当前题需要展示的解析；考试模式下从不展示
fn explanation_for<'a>(session: &'a QuizSession, view: &ConsoleView) -> Option<&'a str> {
    if !view.show_explanation || session.mode() == QuizMode::Exam {
        return None;
    }
    Some(session.current_question().explanation()).filter(|text| !text.is_empty())
}

fn print_help() {
    println!("命令: a-e 作答 | n 下一题 | p 上一题 | g N 跳转 | m [N] 复查标记 | x 解析 | s 交卷 | q 放弃");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{
        AnswerKey, Difficulty, OptionMap, ParsedQuestion, QuestionSet,
    };
    use crate::session::{ExamPolicy, FinishReason, ManualClock, PracticePolicy, SessionPolicy};
    use std::sync::Arc;

    fn session_with(count: u32, policy: Box<dyn SessionPolicy>) -> QuizSession {
        let questions = (1..=count)
            .map(|id| {
                let mut options = OptionMap::new();
                options.insert(OptionLabel::A, "yes");
                options.insert(OptionLabel::B, "no");
                ParsedQuestion::new(
                    id,
                    format!("Question {}", id),
                    options,
                    AnswerKey::Declared(OptionLabel::A),
                    Difficulty::Easy,
                    format!("Explanation {}", id),
                )
                .unwrap()
            })
            .collect();
        let set = Arc::new(QuestionSet::new(questions).unwrap());
        let mut session = QuizSession::new(set, policy, Arc::new(ManualClock::new())).unwrap();
        session.start().unwrap();
        session
    }

    fn practice_session(count: u32) -> QuizSession {
        session_with(count, Box::new(PracticePolicy))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("b"), Some(Command::Answer(OptionLabel::B)));
        assert_eq!(Command::parse(" E "), Some(Command::Answer(OptionLabel::E)));
        assert_eq!(Command::parse("n"), Some(Command::Next));
        assert_eq!(Command::parse("prev"), Some(Command::Previous));
        assert_eq!(Command::parse("g 3"), Some(Command::GoTo(2)));
        assert_eq!(Command::parse("m"), Some(Command::Mark(None)));
        assert_eq!(Command::parse("m 1"), Some(Command::Mark(Some(0))));
        assert_eq!(Command::parse("x"), Some(Command::ToggleExplanation));
        assert_eq!(Command::parse("explain"), Some(Command::ToggleExplanation));
        assert_eq!(Command::parse("s"), Some(Command::Submit));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("f"), None);
        assert_eq!(Command::parse("g"), None);
        assert_eq!(Command::parse("g 0"), None);
        assert_eq!(Command::parse("g x"), None);
        assert_eq!(Command::parse("n 2"), None);
        assert_eq!(Command::parse("x 1"), None);
        assert_eq!(Command::parse("m 1 2"), None);
    }

    #[test]
    fn test_apply_command_keeps_state_on_error() {
        let mut session = practice_session(2);
        let mut view = ConsoleView::default();
        let err = apply_command(&mut session, &mut view, Command::GoTo(5)).unwrap_err();
        assert_eq!(err, SessionError::IndexOutOfRange { index: 5, len: 2 });
        assert_eq!(session.current_index(), 0);

        assert_eq!(
            apply_command(&mut session, &mut view, Command::Quit).unwrap(),
            Step::Abandon
        );
        assert_eq!(session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn test_answer_command_advances() {
        let mut session = practice_session(3);
        let mut view = ConsoleView::default();

        apply_command(&mut session, &mut view, Command::Answer(OptionLabel::B)).unwrap();
        assert_eq!(session.answer_for(1), Some(OptionLabel::B));
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_exam_answer_on_last_question_stays() {
        let mut session = session_with(2, Box::new(ExamPolicy::new(Duration::from_secs(60))));
        let mut view = ConsoleView::default();

        apply_command(&mut session, &mut view, Command::GoTo(1)).unwrap();
        apply_command(&mut session, &mut view, Command::Answer(OptionLabel::A)).unwrap();
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.answer_for(2), Some(OptionLabel::A));
    }

    #[test]
    fn test_toggle_explanation() {
        let mut session = practice_session(2);
        let mut view = ConsoleView::default();
        assert_eq!(explanation_for(&session, &view), None);

        apply_command(&mut session, &mut view, Command::ToggleExplanation).unwrap();
        assert!(view.show_explanation);
        assert_eq!(explanation_for(&session, &view), Some("Explanation 1"));
        assert_eq!(session.current_index(), 0);

        apply_command(&mut session, &mut view, Command::ToggleExplanation).unwrap();
        assert_eq!(explanation_for(&session, &view), None);
    }

    #[test]
    fn test_exam_never_shows_explanation() {
        let session = session_with(1, Box::new(ExamPolicy::new(Duration::from_secs(60))));
        let view = ConsoleView {
            show_explanation: true,
        };
        assert_eq!(explanation_for(&session, &view), None);
    }

    #[tokio::test]
    async fn test_run_session_until_submit() {
        let mut session = practice_session(2);
        let input: &[u8] = b"a\nbogus\nm\np\nb\ns\n";

        let outcome = run_session(&mut session, input, ConsoleView::default())
            .await
            .unwrap();
        assert_eq!(outcome, ConsoleOutcome::Finished);
        assert_eq!(session.finish_reason(), Some(FinishReason::Submitted));
        assert_eq!(session.answer_for(1), Some(OptionLabel::B));
        assert_eq!(session.answer_for(2), None);
        assert!(session.is_marked(1));
    }

    #[tokio::test]
    async fn test_answering_last_practice_question_finishes() {
        let mut session = practice_session(2);
        let input: &[u8] = b"a\nb\nq\n";

        let outcome = run_session(&mut session, input, ConsoleView::default())
            .await
            .unwrap();
        assert_eq!(outcome, ConsoleOutcome::Finished);
        assert_eq!(
            session.finish_reason(),
            Some(FinishReason::CompletedLastQuestion)
        );
        assert_eq!(session.answer_for(2), Some(OptionLabel::B));
    }

    #[tokio::test]
    async fn test_eof_abandons_session() {
        let mut session = practice_session(1);
        let input: &[u8] = b"m\n";

        let outcome = run_session(&mut session, input, ConsoleView::default())
            .await
            .unwrap();
        assert_eq!(outcome, ConsoleOutcome::Abandoned);
        assert_eq!(session.status(), SessionStatus::InProgress);
    }
}
