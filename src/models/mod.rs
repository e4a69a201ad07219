pub mod loaders;
pub mod question;
pub mod report;

pub use loaders::{load_question_set, load_text_file, save_question_set, PlainTextDocument, TextSource};
pub use question::{
    AnswerKey, AnswerSource, Difficulty, OptionLabel, OptionMap, ParsedQuestion, QuestionOption,
    QuestionSet,
};
pub use report::{AnswerStatus, BreakdownRow, ScoreReport};
