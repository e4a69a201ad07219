//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::report::{AnswerStatus, ScoreReport};
use crate::workflow::ExtractionStats;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `input_path`: 题目来源
/// - `mode`: 答题模式
pub fn log_startup(input_path: &Path, mode: impl std::fmt::Display) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 选择题练习");
    info!("📄 题目来源: {}", input_path.display());
    info!("📝 答题模式: {}", mode);
    info!("{}", "=".repeat(60));
}

/// 记录题目提取结果
pub fn log_extraction_summary(stats: &ExtractionStats) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 提取完成: {} 个文本块, 有效 {} 题, 跳过 {} 块",
        stats.blocks, stats.accepted, stats.rejected
    );
    if stats.paragraph_fallback {
        info!("💡 未识别到题号，已按段落切分");
    }
    if stats.placeholder_options > 0 {
        info!("⚠️ {} 题使用了占位选项", stats.placeholder_options);
    }
    if stats.guessed_answers > 0 {
        info!("⚠️ {} 题答案为随机指定", stats.guessed_answers);
    }
    if stats.unverified_answers > 0 {
        info!("⚠️ {} 题答案未核实", stats.unverified_answers);
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终成绩
pub fn log_final_report(report: &ScoreReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 答题结果统计 ({})", report.mode);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));

    for row in &report.breakdown {
        let icon = match row.status {
            AnswerStatus::Correct => "✅",
            AnswerStatus::Incorrect => "❌",
            AnswerStatus::Unanswered => "⏭️",
        };
        let correct = row
            .correct
            .map(|label| label.to_string())
            .unwrap_or_else(|| "?".to_string());
        let flag = if row.marked_for_review { " 🔖" } else { "" };
        info!(
            "{} 第 {} 题: 作答 {} | 答案 {} | 用时 {:.1}s{}",
            icon,
            row.question_id,
            row.selected_display(),
            correct,
            row.elapsed.as_secs_f64(),
            flag
        );
    }

    info!("{}", "=".repeat(60));
    info!("✅ 正确: {}/{}", report.correct_count, report.total_questions());
    info!("❌ 错误: {}", report.incorrect_count);
    info!("⏭️ 未作答: {}", report.unanswered_count);
    if report.unverified_count > 0 {
        info!("❓ 答案未核实: {}", report.unverified_count);
    }
    info!("🎯 正确率: {:.1}%", report.accuracy_percent);
    info!("⏱️ 总用时: {:.1}s", report.total_elapsed_secs());
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }
}
