use crate::error::{AppError, AppResult, FileError};
use crate::models::question::QuestionSet;
use std::path::Path;
use tokio::fs;

/// 从 TOML 题库文件加载题目集合
///
/// 反序列化时会重新校验每道题的不变式，损坏的题库整体拒绝
pub async fn load_question_set(toml_file_path: &Path) -> AppResult<QuestionSet> {
    let path_str = toml_file_path.display().to_string();

    if !toml_file_path.exists() {
        return Err(AppError::File(FileError::NotFound { path: path_str }));
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let set: QuestionSet =
        toml::from_str(&content).map_err(|e| AppError::toml_parse_failed(&path_str, e))?;

    tracing::info!(
        "成功加载题库 {}: {} 个题目",
        toml_file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy(),
        set.len()
    );

    Ok(set)
}

/// 将题目集合保存为 TOML 题库文件（覆盖写入）
pub async fn save_question_set(toml_file_path: &Path, set: &QuestionSet) -> AppResult<()> {
    let content = toml::to_string_pretty(set)?;

    fs::write(toml_file_path, content)
        .await
        .map_err(|e| AppError::file_write_failed(toml_file_path.display().to_string(), e))?;

    tracing::info!(
        "已保存 {} 个题目到 {}",
        set.len(),
        toml_file_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{
        AnswerKey, Difficulty, OptionLabel, OptionMap, ParsedQuestion,
    };

    fn bank() -> QuestionSet {
        let mut options = OptionMap::new();
        options.insert(OptionLabel::A, "Paris");
        options.insert(OptionLabel::B, "Rome");
        let declared = ParsedQuestion::new(
            1,
            "Capital of France?",
            options.clone(),
            AnswerKey::Declared(OptionLabel::A),
            Difficulty::Easy,
            "Correct answer is A.",
        )
        .unwrap();
        let unverified = ParsedQuestion::new(
            2,
            "Capital of Italy?",
            options,
            AnswerKey::Unverified,
            Difficulty::Easy,
            "",
        )
        .unwrap();
        QuestionSet::new(vec![declared, unverified]).unwrap()
    }

    #[tokio::test]
    async fn test_save_then_load_bank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.toml");

        save_question_set(&path, &bank()).await.unwrap();
        let loaded = load_question_set(&path).await.unwrap();

        assert_eq!(loaded, bank());
        assert_eq!(loaded.by_id(2).unwrap().correct_label(), None);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_question_set(&dir.path().join("nope.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::File(FileError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_answer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        let content = r#"
[[questions]]
id = 1
text = "Pick one"
correct = "E"
answer_source = "declared"
difficulty = "easy"

[[questions.options]]
label = "A"
text = "x"

[[questions.options]]
label = "B"
text = "y"
"#;
        tokio::fs::write(&path, content).await.unwrap();

        let err = load_question_set(&path).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::File(FileError::TomlParseFailed { .. })
        ));
    }
}
