use pdf_quiz::config::Config;
use pdf_quiz::models::{load_question_set, save_question_set, AnswerKey, AnswerStatus, OptionLabel};
use pdf_quiz::orchestrator::{build_session, load_questions};
use pdf_quiz::services::{HistoryWriter, MissingAnswerPolicy, ParserOptions, ScoreEngine};
use pdf_quiz::session::{FinishReason, ManualClock, NavOutcome, QuizMode, SessionStatus};
use pdf_quiz::workflow::ExtractionPipeline;
use std::sync::Arc;
use std::time::Duration;

const EXAM: &str = "\
Midterm Exam

Q1. What is 2+2?
A) 3
B) 4
C) 5
Answer: B

Q2. Which planet is known as the red planet?
A) Venus
B) Mars
C) Jupiter
D) Saturn
Answer: B

Q3. Which of these is a prime number?
A) 4
B) 6
C) 7
D) 9
";

fn seeded_pipeline(missing_answer: MissingAnswerPolicy) -> ExtractionPipeline {
    ExtractionPipeline::new(ParserOptions {
        missing_answer,
        seed: Some(42),
        ..ParserOptions::default()
    })
}

#[test]
fn test_extract_then_practice_then_score() {
    let questions = Arc::new(seeded_pipeline(MissingAnswerPolicy::MarkUnverified).extract(EXAM));
    assert_eq!(questions.len(), 3);
    assert_eq!(questions.as_slice()[0].text(), "What is 2+2?");
    assert_eq!(questions.as_slice()[2].answer(), AnswerKey::Unverified);

    let clock = Arc::new(ManualClock::new());
    let mut session = build_session(&Config::default(), questions, clock.clone()).unwrap();
    session.start().unwrap();

    clock.advance_secs(4);
    session.answer_and_advance(OptionLabel::B).unwrap();
    clock.advance_secs(9);
    session.answer_and_advance(OptionLabel::A).unwrap();
    clock.advance_secs(3);
    session.select_answer(OptionLabel::D).unwrap();
    // 单纯导航不会越过最后一题
    assert_eq!(session.next().unwrap(), NavOutcome::Stayed);
    assert_eq!(session.status(), SessionStatus::InProgress);
    assert_eq!(
        session.answer_and_advance(OptionLabel::C).unwrap(),
        NavOutcome::Finished
    );

    assert_eq!(session.status(), SessionStatus::Finished);
    assert_eq!(
        session.finish_reason(),
        Some(FinishReason::CompletedLastQuestion)
    );

    let report = ScoreEngine::new().score(&session).unwrap();
    assert_eq!(report.correct_count, 1);
    assert_eq!(report.incorrect_count, 2);
    assert_eq!(report.unanswered_count, 0);
    assert_eq!(report.unverified_count, 1);
    assert_eq!(report.breakdown[2].status, AnswerStatus::Incorrect);

    // 各题用时之和等于总用时
    let per_question: Duration = report.breakdown.iter().map(|row| row.elapsed).sum();
    assert_eq!(per_question, report.total_elapsed);
    assert_eq!(report.total_elapsed, Duration::from_secs(16));
    assert_eq!(
        report.correct_count + report.incorrect_count + report.unanswered_count,
        report.total_questions()
    );
}

#[test]
fn test_exam_auto_submits_exactly_once() {
    let questions = Arc::new(seeded_pipeline(MissingAnswerPolicy::RandomGuess).extract(EXAM));
    let config = Config {
        mode: QuizMode::Exam,
        exam_duration_secs: Some(60),
        ..Config::default()
    };

    let clock = Arc::new(ManualClock::new());
    let mut session = build_session(&config, questions, clock.clone()).unwrap();
    session.start().unwrap();

    clock.advance_secs(20);
    session.answer_and_advance(OptionLabel::B).unwrap();
    clock.advance_secs(45);

    assert!(session.poll_deadline());
    assert!(!session.poll_deadline());
    assert_eq!(session.status(), SessionStatus::Finished);
    assert_eq!(session.finish_reason(), Some(FinishReason::TimeExpired));
    assert_eq!(session.remaining(), Some(Duration::ZERO));

    // 结束后的操作被拒绝，答案不变
    assert!(session.select_answer(OptionLabel::A).is_err());
    assert_eq!(session.answer_for(2), None);

    let report = ScoreEngine::new().score(&session).unwrap();
    assert_eq!(report.total_elapsed, Duration::from_secs(60));
    assert_eq!(report.correct_count, 1);
    assert_eq!(report.unanswered_count, 2);
    assert_eq!(report.mode, QuizMode::Exam);
}

#[test]
fn test_guessed_answers_stay_within_options() {
    let questions = seeded_pipeline(MissingAnswerPolicy::RandomGuess).extract(EXAM);
    let third = &questions.as_slice()[2];

    assert!(matches!(third.answer(), AnswerKey::Guessed(_)));
    let label = third.correct_label().unwrap();
    assert!(third.options().contains(label));
}

#[tokio::test]
async fn test_bank_round_trip_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let text_path = dir.path().join("midterm.txt");
    tokio::fs::write(&text_path, EXAM).await.unwrap();

    let config = Config {
        input_path: text_path,
        missing_answer_policy: MissingAnswerPolicy::Reject,
        ..Config::default()
    };
    let questions = load_questions(&config).await.unwrap();
    assert_eq!(questions.len(), 2);

    let bank_path = dir.path().join("midterm.toml");
    save_question_set(&bank_path, &questions).await.unwrap();
    let reloaded = load_question_set(&bank_path).await.unwrap();
    assert_eq!(reloaded, questions);

    let clock = Arc::new(ManualClock::new());
    let mut session = build_session(&config, Arc::new(reloaded), clock.clone()).unwrap();
    session.start().unwrap();
    clock.advance_secs(2);
    session.select_answer(OptionLabel::B).unwrap();
    session.submit().unwrap();

    let report = ScoreEngine::new().score(&session).unwrap();
    let history = HistoryWriter::with_path(dir.path().join("history.jsonl"));
    history.append("midterm.txt", &report).await.unwrap();

    let content = tokio::fs::read_to_string(history.path()).await.unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\"source\":\"midterm.txt\""));
    assert!(content.contains("\"finish_reason\":\"submitted\""));
}
