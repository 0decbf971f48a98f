//! 按学期分组与学期汇总

use std::sync::OnceLock;

use regex::Regex;

use crate::grading::grade_points;
use crate::models::{CourseGradeRecord, GradeStatus, SemesterSummary};

/// 没有学期信息的记录统一归入这个分组
pub const UNSPECIFIED_SEMESTER: &str = "Chưa xác định";

/// 一个学期分组
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterGroup {
    pub label: String,
    pub records: Vec<CourseGradeRecord>,
}

/// 按 `courseRef.semesterInfo.displayName` 分组，保持首次出现的顺序
pub fn group_by_semester(records: &[CourseGradeRecord]) -> Vec<SemesterGroup> {
    let mut groups: Vec<SemesterGroup> = Vec::new();
    for record in records {
        let label = record.semester_label().unwrap_or(UNSPECIFIED_SEMESTER);
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(SemesterGroup {
                label: label.to_string(),
                records: vec![record.clone()],
            }),
        }
    }
    groups
}

/// 从学期名称中提取学年起始年份，例如 "HK1 2023-2024" → 2023
pub fn parse_year(label: &str) -> Option<i32> {
    static YEAR_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = YEAR_RE
        .get_or_init(|| Regex::new(r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)").ok())
        .as_ref()?;
    re.captures(label)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 计算每个学期的汇总
pub fn semester_summaries(records: &[CourseGradeRecord]) -> Vec<SemesterSummary> {
    group_by_semester(records)
        .into_iter()
        .map(|group| summarize_group(&group))
        .collect()
}

fn summarize_group(group: &SemesterGroup) -> SemesterSummary {
    let info = group
        .records
        .iter()
        .find_map(|r| r.course_ref.semester_info.as_ref());

    let semester_id = info
        .and_then(|i| i.id.clone())
        .unwrap_or_else(|| group.label.clone());
    let year = info
        .and_then(|i| i.year)
        .or_else(|| parse_year(&group.label));

    let mut total_credits = 0.0;
    let mut completed_credits = 0.0;
    let mut failed_credits = 0.0;
    let mut completed_courses = 0;
    for record in &group.records {
        let credits = record.credits();
        total_credits += credits;
        match record.status {
            GradeStatus::Completed => {
                completed_credits += credits;
                completed_courses += 1;
            }
            GradeStatus::Failed => failed_credits += credits,
            GradeStatus::Pending => {}
        }
    }

    SemesterSummary {
        semester_id,
        semester_name: group.label.clone(),
        year,
        gpa: estimate_gpa(&group.records),
        total_credits,
        completed_credits,
        failed_credits,
        completed_courses,
    }
}

/// 按学分加权的绩点估算，未出分（pending）的课程不计入
///
/// 所有已出分课程都没有学分时退化为简单平均。
fn estimate_gpa(records: &[CourseGradeRecord]) -> f64 {
    let graded: Vec<&CourseGradeRecord> = records
        .iter()
        .filter(|r| r.status != GradeStatus::Pending)
        .collect();
    if graded.is_empty() {
        return 0.0;
    }

    let credit_sum: f64 = graded.iter().map(|r| r.credits()).sum();
    let gpa = if credit_sum > 0.0 {
        graded
            .iter()
            .map(|r| grade_points(r.composite_score()) * r.credits())
            .sum::<f64>()
            / credit_sum
    } else {
        graded
            .iter()
            .map(|r| grade_points(r.composite_score()))
            .sum::<f64>()
            / graded.len() as f64
    };
    (gpa * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourseRef, SemesterInfo};

    fn record(
        id: &str,
        semester: Option<&str>,
        score: f64,
        credits: f64,
        status: GradeStatus,
    ) -> CourseGradeRecord {
        let course_ref = CourseRef {
            credits: Some(credits),
            semester_info: semester.map(|name| SemesterInfo {
                display_name: Some(name.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        CourseGradeRecord::new(id, course_ref, Vec::new(), Some(score), status, None)
    }

    #[test]
    fn test_unspecified_records_share_one_bucket() {
        let records = vec![
            record("a", None, 8.0, 3.0, GradeStatus::Completed),
            record("b", Some("HK1 2023-2024"), 7.0, 3.0, GradeStatus::Completed),
            record("c", None, 6.0, 2.0, GradeStatus::Completed),
        ];
        let groups = group_by_semester(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, UNSPECIFIED_SEMESTER);
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[1].label, "HK1 2023-2024");
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("HK1 2023-2024"), Some(2023));
        assert_eq!(parse_year("Học kỳ hè 2022"), Some(2022));
        assert_eq!(parse_year("Semester 12345"), None);
        assert_eq!(parse_year("Chưa xác định"), None);
    }

    #[test]
    fn test_semester_summary_credits_and_gpa() {
        let records = vec![
            record("a", Some("HK1 2023-2024"), 9.2, 3.0, GradeStatus::Completed),
            record("b", Some("HK1 2023-2024"), 7.5, 2.0, GradeStatus::Completed),
            record("c", Some("HK1 2023-2024"), 2.0, 4.0, GradeStatus::Failed),
            record("d", Some("HK1 2023-2024"), 0.0, 3.0, GradeStatus::Pending),
        ];
        let summaries = semester_summaries(&records);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.semester_id, "HK1 2023-2024");
        assert_eq!(summary.year, Some(2023));
        assert_eq!(summary.total_credits, 12.0);
        assert_eq!(summary.completed_credits, 5.0);
        assert_eq!(summary.failed_credits, 4.0);
        assert_eq!(summary.completed_courses, 2);
        // (4.0*3 + 3.0*2 + 0*4) / 9 = 2.0
        assert_eq!(summary.gpa, 2.0);
    }

    #[test]
    fn test_pending_only_semester_has_zero_gpa() {
        let records = vec![record("a", Some("HK2 2023-2024"), 0.0, 3.0, GradeStatus::Pending)];
        assert_eq!(semester_summaries(&records)[0].gpa, 0.0);
    }
}
