pub mod history_writer;
pub mod question_parser;
pub mod score_engine;
pub mod segmenter;

pub use history_writer::HistoryWriter;
pub use question_parser::{
    MissingAnswerPolicy, MissingOptionsPolicy, ParserOptions, QuestionDraft, QuestionParser,
    RejectReason,
};
pub use score_engine::ScoreEngine;
pub use segmenter::{QuestionBlock, SegmentStyle, TextSegmenter};
