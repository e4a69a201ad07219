use thiserror::Error;

use crate::models::question::OptionLabel;
use crate::session::SessionStatus;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 答题会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 题目数据错误
    #[error("题目错误: {0}")]
    Question(#[from] QuestionError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 答题会话错误
///
/// 所有会话错误都不会修改会话状态
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 当前状态不允许该操作
    #[error("操作 `{operation}` 在状态 {status:?} 下不可用")]
    InvalidState {
        operation: &'static str,
        status: SessionStatus,
    },
    /// 题目索引越界
    #[error("索引 {index} 超出范围 [0, {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// 选项不属于当前题目
    #[error("选项 {label} 不属于题目 {question_id}")]
    InvalidLabel {
        label: OptionLabel,
        question_id: u32,
    },
    /// 题目集合为空，无法开始答题
    #[error("题目集合为空")]
    EmptyQuestionSet,
    /// 会话尚未结束，无法评分
    #[error("会话尚未结束，无法评分 (当前状态: {status:?})")]
    NotFinished { status: SessionStatus },
}

/// 题目数据错误（构造或编辑时的校验失败）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    /// 选项数量不足
    #[error("题目 {id} 至少需要 2 个选项，实际 {count} 个")]
    TooFewOptions { id: u32, count: usize },
    /// 选项字母重复
    #[error("题目 {id} 的选项 {label} 重复")]
    DuplicateLabel { id: u32, label: OptionLabel },
    /// 正确答案不在选项中
    #[error("题目 {id} 的答案 {label} 不在选项中")]
    AnswerNotInOptions { id: u32, label: OptionLabel },
    /// 题干为空
    #[error("题目 {id} 的题干为空")]
    EmptyText { id: u32 },
    /// 题目ID重复
    #[error("题目ID重复: {id}")]
    DuplicateId { id: u32 },
    /// 题目ID为 0
    #[error("题目ID必须从 1 开始")]
    ZeroId,
    /// 题目不存在
    #[error("题目不存在: {id}")]
    NotFound { id: u32 },
    /// 答案来源与答案字母不一致
    #[error("题目 {id} 的答案来源与答案字母不一致")]
    AnswerSourceMismatch { id: u32 },
    /// 非法选项字母
    #[error("非法选项字母: {0:?}")]
    InvalidLabel(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// TOML 序列化失败
    #[error("TOML序列化失败: {0}")]
    TomlSerializeFailed(#[from] toml::ser::Error),
    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    JsonFailed(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::File(FileError::TomlSerializeFailed(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::File(FileError::JsonFailed(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建TOML解析错误
    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_wraps_into_app_error() {
        let err: AppError = SessionError::IndexOutOfRange { index: 5, len: 3 }.into();
        assert!(matches!(err, AppError::Session(_)));
        assert_eq!(err.to_string(), "会话错误: 索引 5 超出范围 [0, 3)");
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AppError::file_read_failed("a.txt", io);
        let file_err = match &err {
            AppError::File(inner) => inner,
            other => panic!("unexpected error: {other:?}"),
        };
        assert!(file_err.source().is_some());
        assert!(err.to_string().contains("a.txt"));
    }
}
