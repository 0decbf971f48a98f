use serde::{Deserialize, Serialize};

/// 全局成绩概览
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSnapshot {
    pub total_credits: f64,
    pub total_courses: usize,
    pub completed_courses: usize,
    pub pending_courses: usize,
    pub failed_courses: usize,
    #[serde(rename = "cumulativeGPA")]
    pub cumulative_gpa: f64,
}

/// 学期汇总，随源记录重新计算，不单独持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterSummary {
    pub semester_id: String,
    pub semester_name: String,
    pub year: Option<i32>,
    /// 按学分加权的绩点估算（4 分制）
    pub gpa: f64,
    pub total_credits: f64,
    pub completed_credits: f64,
    pub failed_credits: f64,
    pub completed_courses: usize,
}

/// 学生档案里的 GPA / 学分字段，用作统计缺失时的估算来源
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub gpa: Option<f64>,
    pub total_credits: Option<f64>,
    pub completed_credits: Option<f64>,
}

impl StudentInfo {
    pub fn is_empty(&self) -> bool {
        self.gpa.is_none() && self.total_credits.is_none() && self.completed_credits.is_none()
    }
}

/// 分数分布
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    /// 字母等级不是 F 的课程数
    pub passed: usize,
    pub failed: usize,
}
