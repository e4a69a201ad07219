pub mod text_loader;
pub mod toml_loader;

pub use text_loader::{join_pages, load_text_file, read_raw_text, PlainTextDocument, TextSource};
pub use toml_loader::{load_question_set, save_question_set};
