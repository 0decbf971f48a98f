//! 全局概览统计

use crate::models::{CourseGradeRecord, GradeStatus, OverviewSnapshot, ScoreStats};

/// 汇总成绩记录
///
/// `cumulative_gpa` 不由本地计算（服务端才是 4 分制 GPA 的权威），这里总是 0，
/// 由 [`super::resolve_stats`] 决定最终值。
pub fn aggregate(records: &[CourseGradeRecord]) -> OverviewSnapshot {
    records
        .iter()
        .fold(OverviewSnapshot::default(), |mut snapshot, record| {
            snapshot.total_credits += record.credits();
            snapshot.total_courses += 1;
            match record.status {
                GradeStatus::Completed => snapshot.completed_courses += 1,
                GradeStatus::Pending => snapshot.pending_courses += 1,
                GradeStatus::Failed => snapshot.failed_courses += 1,
            }
            snapshot
        })
}

/// 分数分布，空列表返回 `None`
pub fn score_stats(records: &[CourseGradeRecord]) -> Option<ScoreStats> {
    if records.is_empty() {
        return None;
    }

    let scores: Vec<f64> = records.iter().map(|r| r.composite_score()).collect();
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = scores.iter().sum::<f64>() / scores.len() as f64;
    let passed = records
        .iter()
        .filter(|r| r.letter_grade().is_passing())
        .count();

    Some(ScoreStats {
        min,
        max,
        average: (average * 100.0).round() / 100.0,
        passed,
        failed: records.len() - passed,
    })
}
