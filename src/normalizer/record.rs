//! 单条记录、统计块和学生档案的宽松解析

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::fields::{first_f64, first_string, first_usize, first_value, lenient_string};
use crate::models::{
    CourseGradeRecord, CourseRef, GradeStatus, OverviewSnapshot, ScoreComponent, SemesterInfo,
    StudentInfo,
};

/// 评分项缺少满分字段时的默认值
const DEFAULT_MAX_SCORE: f64 = 10.0;

const ID_KEYS: &[&str] = &["id", "_id"];
const COURSE_KEYS: &[&str] = &["courseRef", "course", "courseId"];
const COMPONENT_KEYS: &[&str] = &["components", "scores", "scoreComponents"];
const COMPOSITE_KEYS: &[&str] = &["compositeScore", "finalScore", "totalScore", "score"];
const SEMESTER_KEYS: &[&str] = &["semesterInfo", "semester"];

/// 解析单条成绩记录
///
/// 非对象或缺少 id 的条目返回 `None`。
pub fn parse_record(item: &Value) -> Option<CourseGradeRecord> {
    if !item.is_object() {
        debug!("跳过非对象成绩条目: {}", item);
        return None;
    }
    let Some(id) = first_string(item, ID_KEYS) else {
        debug!("跳过缺少 id 的成绩条目");
        return None;
    };

    let mut course_ref = first_value(item, COURSE_KEYS)
        .map(parse_course_ref)
        .unwrap_or_default();
    if course_ref.semester_info.is_none() {
        course_ref.semester_info = first_value(item, SEMESTER_KEYS).and_then(parse_semester);
    }
    if course_ref.instructor_name.is_none() {
        course_ref.instructor_name =
            first_value(item, &["instructorName", "instructor"]).and_then(parse_person_name);
    }
    if course_ref.credits.is_none() {
        course_ref.credits = first_f64(item, &["credits", "credit", "creditHours"]);
    }

    let components = first_value(item, COMPONENT_KEYS)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_component).collect())
        .unwrap_or_default();

    let status = first_string(item, &["status"])
        .map(|s| GradeStatus::parse_lenient(&s))
        .unwrap_or_default();

    let last_updated_at = first_string(item, &["lastUpdatedAt", "updatedAt"])
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(CourseGradeRecord::new(
        id,
        course_ref,
        components,
        first_f64(item, COMPOSITE_KEYS),
        status,
        last_updated_at,
    ))
}

fn parse_course_ref(value: &Value) -> CourseRef {
    if !value.is_object() {
        // 未展开的课程只有一个 id
        return CourseRef {
            course_id: lenient_string(value),
            ..Default::default()
        };
    }
    CourseRef {
        course_id: first_string(value, &["courseId", "id", "_id"]),
        name: first_string(value, &["name", "courseName", "displayName"]),
        code: first_string(value, &["code", "courseCode"]),
        credits: first_f64(value, &["credits", "credit", "creditHours"]),
        instructor_name: first_value(value, &["instructorName", "instructor"])
            .and_then(parse_person_name),
        semester_info: first_value(value, SEMESTER_KEYS).and_then(parse_semester),
    }
}

fn parse_person_name(value: &Value) -> Option<String> {
    if value.is_object() {
        first_string(value, &["fullName", "name"])
    } else {
        lenient_string(value)
    }
}

fn parse_semester(value: &Value) -> Option<SemesterInfo> {
    if !value.is_object() {
        return lenient_string(value).map(|label| SemesterInfo {
            display_name: Some(label),
            ..Default::default()
        });
    }
    let info = SemesterInfo {
        id: first_string(value, &["id", "_id", "semesterId"]),
        display_name: first_string(value, &["displayName", "name", "semesterName"]),
        year: first_f64(value, &["year"]).map(|y| y as i32),
    };
    (info != SemesterInfo::default()).then_some(info)
}

fn parse_component(value: &Value) -> Option<ScoreComponent> {
    let name = first_string(value, &["name", "type", "label"]).unwrap_or_default();
    let score = first_f64(value, &["score", "value"])?;
    let max_score = first_f64(value, &["maxScore", "max"]).unwrap_or(DEFAULT_MAX_SCORE);
    Some(ScoreComponent::new(name, score, max_score))
}

/// 解析服务端统计块
///
/// 服务端给出的字段原样透传，缺失字段取自 `fallback`。
pub fn parse_stats(value: &Value, fallback: &OverviewSnapshot) -> OverviewSnapshot {
    OverviewSnapshot {
        total_credits: first_f64(value, &["totalCredits", "credits"])
            .unwrap_or(fallback.total_credits),
        total_courses: first_usize(value, &["totalCourses"]).unwrap_or(fallback.total_courses),
        completed_courses: first_usize(value, &["completedCourses"])
            .unwrap_or(fallback.completed_courses),
        pending_courses: first_usize(value, &["pendingCourses"])
            .unwrap_or(fallback.pending_courses),
        failed_courses: first_usize(value, &["failedCourses"]).unwrap_or(fallback.failed_courses),
        cumulative_gpa: first_f64(value, &["cumulativeGPA", "cumulativeGpa", "gpa"])
            .unwrap_or(fallback.cumulative_gpa),
    }
}

/// 解析学生档案中的 GPA / 学分字段
pub fn parse_student_info(value: &Value) -> StudentInfo {
    StudentInfo {
        gpa: first_f64(value, &["gpa", "cumulativeGPA", "cumulativeGpa"]),
        total_credits: first_f64(value, &["totalCredits", "credits"]),
        completed_credits: first_f64(value, &["completedCredits", "earnedCredits"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::LetterGrade;
    use serde_json::json;

    #[test]
    fn test_parse_populated_record() {
        let item = json!({
            "_id": "g1",
            "courseId": {
                "_id": "c1",
                "name": "Cấu trúc dữ liệu",
                "code": "IT003",
                "credits": 4,
                "instructor": {"fullName": "Nguyễn Văn A"},
                "semesterInfo": {"_id": "hk1", "displayName": "HK1 2023-2024"}
            },
            "scores": [
                {"name": "Giữa kỳ", "score": 8, "maxScore": 10},
                {"name": "Cuối kỳ", "score": "6"},
                {"name": "Điểm danh", "score": 10}
            ],
            "status": "completed",
            "letterGrade": "A+",
            "updatedAt": "2024-01-15T08:30:00Z"
        });

        let record = parse_record(&item).unwrap();
        assert_eq!(record.id, "g1");
        assert_eq!(record.course_ref.course_id.as_deref(), Some("c1"));
        assert_eq!(record.course_ref.instructor_name.as_deref(), Some("Nguyễn Văn A"));
        assert_eq!(record.credits(), 4.0);
        assert_eq!(record.semester_label(), Some("HK1 2023-2024"));
        assert_eq!(record.components.len(), 3);
        assert_eq!(record.components[1].max_score, 10.0);
        // 服务端的字母等级被忽略，总是由总评分推导
        assert_eq!(record.composite_score(), 7.0);
        assert_eq!(record.letter_grade(), LetterGrade::B);
        assert_eq!(record.status, GradeStatus::Completed);
        assert!(record.last_updated_at.is_some());
    }

    #[test]
    fn test_server_composite_takes_priority() {
        let item = json!({
            "id": 17,
            "course": "c9",
            "components": [{"name": "Final", "score": 2}],
            "finalScore": "8.6"
        });
        let record = parse_record(&item).unwrap();
        assert_eq!(record.id, "17");
        assert_eq!(record.course_ref.course_id.as_deref(), Some("c9"));
        assert_eq!(record.composite_score(), 8.6);
        assert_eq!(record.letter_grade(), LetterGrade::A);
    }

    #[test]
    fn test_bare_record_defaults() {
        let record = parse_record(&json!({"id": "g2"})).unwrap();
        assert_eq!(record.composite_score(), 0.0);
        assert_eq!(record.letter_grade(), LetterGrade::F);
        assert_eq!(record.status, GradeStatus::Pending);
        assert_eq!(record.course_ref, CourseRef::default());
        assert!(record.last_updated_at.is_none());
    }

    #[test]
    fn test_rejects_unusable_items() {
        assert!(parse_record(&json!("g1")).is_none());
        assert!(parse_record(&json!({"course": "c1"})).is_none());
    }

    #[test]
    fn test_top_level_semester_label() {
        let record = parse_record(&json!({"id": "g3", "semester": "HK2 2022-2023"})).unwrap();
        assert_eq!(record.semester_label(), Some("HK2 2022-2023"));
    }

    #[test]
    fn test_stats_fill_missing_fields_from_fallback() {
        let fallback = OverviewSnapshot {
            total_courses: 5,
            pending_courses: 2,
            ..Default::default()
        };
        let stats = parse_stats(&json!({"credits": 42, "gpa": 3.4, "completedCourses": 3}), &fallback);
        assert_eq!(stats.total_credits, 42.0);
        assert_eq!(stats.cumulative_gpa, 3.4);
        assert_eq!(stats.completed_courses, 3);
        assert_eq!(stats.total_courses, 5);
        assert_eq!(stats.pending_courses, 2);
    }
}
