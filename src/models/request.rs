//! 发往数据访问层的请求参数

use serde::Serialize;

use super::grade::{GradeStatus, ScoreComponent};

/// 成绩列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GradeStatus>,
}

impl GradeFilters {
    pub fn for_student(student_id: impl Into<String>) -> Self {
        Self {
            student_id: Some(student_id.into()),
            ..Default::default()
        }
    }

    /// 转为查询参数，顺序固定
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(v) = &self.student_id {
            query.push(("studentId", v.clone()));
        }
        if let Some(v) = &self.course_id {
            query.push(("courseId", v.clone()));
        }
        if let Some(v) = &self.semester {
            query.push(("semester", v.clone()));
        }
        if let Some(v) = self.status {
            query.push(("status", v.as_str().to_string()));
        }
        query
    }

    /// 同一组过滤条件对应同一个请求键
    pub fn request_key(&self) -> String {
        let parts: Vec<String> = self
            .to_query()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("grades:list?{}", parts.join("&"))
    }
}

/// 新建成绩的输入
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeInput {
    pub student_id: String,
    pub course_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ScoreComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GradeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
}

/// 成绩修改内容，只序列化出现的字段
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ScoreComponent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GradeStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_key_is_stable() {
        let filters = GradeFilters {
            student_id: Some("s1".to_string()),
            status: Some(GradeStatus::Failed),
            ..Default::default()
        };
        assert_eq!(filters.request_key(), "grades:list?studentId=s1&status=failed");
        assert_eq!(GradeFilters::default().request_key(), "grades:list?");
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = GradePatch {
            status: Some(GradeStatus::Completed),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"status": "completed"}));
    }
}
