//! 课程成绩记录
//!
//! 规范化之后的成绩实体，界面层只会看到这里的类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grading::{band_for_score, compute_composite, letter_for, AcademicBand, LetterGrade};

/// 单个评分项（出勤、期中、期末、作业……）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
}

impl ScoreComponent {
    pub fn new(name: impl Into<String>, score: f64, max_score: f64) -> Self {
        Self {
            name: name.into(),
            score,
            max_score,
        }
    }
}

/// 学期信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// 课程引用，所有展示字段都可缺失
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester_info: Option<SemesterInfo>,
}

/// 成绩状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeStatus {
    Completed,
    #[default]
    Pending,
    Failed,
}

impl GradeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GradeStatus::Completed => "completed",
            GradeStatus::Pending => "pending",
            GradeStatus::Failed => "failed",
        }
    }

    /// 宽松解析服务端返回的状态字符串，无法识别时视为 pending
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "completed" | "complete" | "passed" | "pass" | "done" => GradeStatus::Completed,
            "failed" | "fail" => GradeStatus::Failed,
            _ => GradeStatus::Pending,
        }
    }
}

impl std::fmt::Display for GradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单门课程的成绩记录
///
/// `letter_grade` 总是由 `composite_score` 推导，修改分数只能通过
/// [`CourseGradeRecord::set_composite_score`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGradeRecord {
    pub id: String,
    pub course_ref: CourseRef,
    pub components: Vec<ScoreComponent>,
    composite_score: f64,
    letter_grade: LetterGrade,
    pub status: GradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl CourseGradeRecord {
    /// 创建成绩记录
    ///
    /// # 参数
    /// - `composite_score`: 服务端给出的总评分；为 `None` 时由 `components` 计算
    pub fn new(
        id: impl Into<String>,
        course_ref: CourseRef,
        components: Vec<ScoreComponent>,
        composite_score: Option<f64>,
        status: GradeStatus,
        last_updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        let score = composite_score.unwrap_or_else(|| compute_composite(&components));
        let mut record = Self {
            id: id.into(),
            course_ref,
            components,
            composite_score: 0.0,
            letter_grade: LetterGrade::F,
            status,
            last_updated_at,
        };
        record.set_composite_score(score);
        record
    }

    pub fn composite_score(&self) -> f64 {
        self.composite_score
    }

    pub fn letter_grade(&self) -> LetterGrade {
        self.letter_grade
    }

    /// 设置总评分（限制在 0-10 之间）并同步字母等级
    pub fn set_composite_score(&mut self, score: f64) {
        let score = if score.is_finite() {
            score.clamp(0.0, 10.0)
        } else {
            0.0
        };
        self.composite_score = score;
        self.letter_grade = letter_for(score);
    }

    /// 用当前的评分项重新计算总评分
    pub fn recompute_from_components(&mut self) {
        let score = compute_composite(&self.components);
        self.set_composite_score(score);
    }

    /// 定性等级（Xuất sắc / Giỏi / ...）
    pub fn band(&self) -> AcademicBand {
        band_for_score(self.composite_score)
    }

    /// 学分，缺失时为 0
    pub fn credits(&self) -> f64 {
        self.course_ref.credits.unwrap_or(0.0)
    }

    pub fn semester_label(&self) -> Option<&str> {
        self.course_ref
            .semester_info
            .as_ref()
            .and_then(|s| s.display_name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}
