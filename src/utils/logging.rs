/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::aggregation::{ResolvedStats, StatsSource};
use crate::grading::band_for_gpa;
use crate::models::SemesterSummary;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则为 `info`（`verbose` 时为 `debug`）。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(api_base_url: &str, student_id: &str) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 成绩查询启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 服务地址: {}", api_base_url);
    info!("🎓 学生: {}", student_id);
    info!("{}", "=".repeat(60));
}

/// 记录全局概览
pub fn log_overview(stats: &ResolvedStats) {
    let snapshot = &stats.snapshot;
    info!("\n{}", "=".repeat(60));
    info!("📊 成绩概览");
    info!("{}", "=".repeat(60));
    info!("总学分: {}", snapshot.total_credits);
    info!(
        "课程: {} (已完成 {}, 进行中 {}, 未通过 {})",
        snapshot.total_courses,
        snapshot.completed_courses,
        snapshot.pending_courses,
        snapshot.failed_courses
    );
    match stats.gpa() {
        Some(gpa) => info!(
            "GPA: {:.2} ({}) [来源: {}]",
            gpa,
            band_for_gpa(gpa),
            source_label(stats.source)
        ),
        None => info!("GPA: 未知"),
    }
}

/// 记录学期汇总
pub fn log_semester(summary: &SemesterSummary) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📅 {} ({})",
        truncate_text(&summary.semester_name, 40),
        summary
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    info!(
        "学分: {} / 已获得 {} / 未通过 {}",
        summary.total_credits, summary.completed_credits, summary.failed_credits
    );
    info!(
        "已完成课程: {} | 学期绩点估算: {:.2}",
        summary.completed_courses, summary.gpa
    );
}

fn source_label(source: StatsSource) -> &'static str {
    match source {
        StatsSource::Server => "服务端",
        StatsSource::Previous => "已知值",
        StatsSource::StudentInfo => "学生档案估算",
        StatsSource::Unknown => "未知",
    }
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
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("Học kỳ 1", 20), "Học kỳ 1");
        assert_eq!(truncate_text("Học kỳ 1", 3), "Học...");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}
