//! 统计回退链
//!
//! 服务端统计 → 学生档案估算 → 之前已知的统计（内存或缓存）→ 本地计数（GPA 未知）。
//! 数据只是换了形状没到达时，不能直接把界面上的数字清零。

use serde::{Deserialize, Serialize};

use super::overview::aggregate;
use crate::models::{CourseGradeRecord, OverviewSnapshot, StudentInfo};

/// 统计来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatsSource {
    /// 本次响应中的统计块
    Server,
    /// 之前已知的值
    Previous,
    /// 由学生档案的 GPA / 学分估算
    StudentInfo,
    /// 没有任何 GPA 来源，GPA 记为 0
    Unknown,
}

/// 回退链的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStats {
    pub snapshot: OverviewSnapshot,
    pub source: StatsSource,
}

impl ResolvedStats {
    /// GPA，来源未知时返回 `None` 以区分“确实为 0”
    pub fn gpa(&self) -> Option<f64> {
        (self.source != StatsSource::Unknown).then_some(self.snapshot.cumulative_gpa)
    }
}

/// 按回退链决定统计值
///
/// # 参数
/// - `server`: 本次响应解析出的统计
/// - `previous`: 之前持有或缓存的统计
/// - `student_info`: 学生档案字段
/// - `records`: 本次的记录，用于本地计数
pub fn resolve_stats(
    server: Option<&OverviewSnapshot>,
    previous: Option<&OverviewSnapshot>,
    student_info: Option<&StudentInfo>,
    records: &[CourseGradeRecord],
) -> ResolvedStats {
    if let Some(stats) = server {
        return ResolvedStats {
            snapshot: stats.clone(),
            source: StatsSource::Server,
        };
    }
    let local = aggregate(records);
    if let Some(gpa) = student_info.and_then(|info| info.gpa) {
        let total_credits = student_info
            .and_then(|info| info.total_credits)
            .unwrap_or(local.total_credits);
        return ResolvedStats {
            snapshot: OverviewSnapshot {
                total_credits,
                cumulative_gpa: gpa,
                ..local
            },
            source: StatsSource::StudentInfo,
        };
    }

    if let Some(stats) = previous {
        return ResolvedStats {
            snapshot: stats.clone(),
            source: StatsSource::Previous,
        };
    }

    ResolvedStats {
        snapshot: local,
        source: StatsSource::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseRef, GradeStatus};

    fn completed(id: &str, credits: f64) -> CourseGradeRecord {
        let course_ref = CourseRef {
            credits: Some(credits),
            ..Default::default()
        };
        CourseGradeRecord::new(id, course_ref, Vec::new(), Some(8.0), GradeStatus::Completed, None)
    }

    fn snapshot(gpa: f64) -> OverviewSnapshot {
        OverviewSnapshot {
            cumulative_gpa: gpa,
            total_credits: 30.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_server_stats_pass_through() {
        let server = snapshot(3.4);
        let resolved = resolve_stats(Some(&server), Some(&snapshot(2.0)), None, &[]);
        assert_eq!(resolved.source, StatsSource::Server);
        assert_eq!(resolved.snapshot, server);
        assert_eq!(resolved.gpa(), Some(3.4));
    }

    #[test]
    fn test_student_info_beats_previous_stats() {
        let info = StudentInfo {
            gpa: Some(1.0),
            ..Default::default()
        };
        let resolved = resolve_stats(None, Some(&snapshot(2.9)), Some(&info), &[]);
        assert_eq!(resolved.source, StatsSource::StudentInfo);
        assert_eq!(resolved.snapshot.cumulative_gpa, 1.0);
    }

    #[test]
    fn test_previous_stats_when_nothing_fresher() {
        // 学生档案没有 GPA 时不算可用的估算
        let info = StudentInfo {
            total_credits: Some(12.0),
            ..Default::default()
        };
        let resolved = resolve_stats(None, Some(&snapshot(2.9)), Some(&info), &[]);
        assert_eq!(resolved.source, StatsSource::Previous);
        assert_eq!(resolved.snapshot.cumulative_gpa, 2.9);

        let resolved = resolve_stats(None, Some(&snapshot(2.9)), None, &[]);
        assert_eq!(resolved.source, StatsSource::Previous);
    }

    #[test]
    fn test_student_info_estimate() {
        let info = StudentInfo {
            gpa: Some(3.1),
            total_credits: None,
            completed_credits: Some(40.0),
        };
        let records = vec![completed("a", 3.0), completed("b", 4.0)];
        let resolved = resolve_stats(None, None, Some(&info), &records);
        assert_eq!(resolved.source, StatsSource::StudentInfo);
        assert_eq!(resolved.snapshot.cumulative_gpa, 3.1);
        assert_eq!(resolved.snapshot.total_credits, 7.0);
        assert_eq!(resolved.snapshot.completed_courses, 2);
    }

    #[test]
    fn test_unknown_keeps_local_counts_and_hides_gpa() {
        let records = vec![completed("a", 3.0)];
        let resolved = resolve_stats(None, None, Some(&StudentInfo::default()), &records);
        assert_eq!(resolved.source, StatsSource::Unknown);
        assert_eq!(resolved.snapshot.total_courses, 1);
        assert_eq!(resolved.snapshot.total_credits, 3.0);
        assert_eq!(resolved.snapshot.cumulative_gpa, 0.0);
        assert_eq!(resolved.gpa(), None);
    }
}
