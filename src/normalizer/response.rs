//! 响应规范化
//!
//! 把形状各异的接口返回转为统一的 [`NormalizedResponse`]，纯函数，无副作用。

use serde_json::Value;
use tracing::debug;

use super::probe::{
    first_match, RECORD_LIST_PROBES, SINGLE_RECORD_PROBES, STATS_PROBES, STUDENT_INFO_PROBES,
};
use super::record::{parse_record, parse_stats, parse_student_info};
use crate::aggregation::aggregate;
use crate::models::{CourseGradeRecord, OverviewSnapshot, StudentInfo};

/// 规范化结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedResponse {
    pub records: Vec<CourseGradeRecord>,
    /// 服务端没有给出统计时为 `None`，调用方应回退到已知值而不是清零
    pub stats: Option<OverviewSnapshot>,
    pub student_info: Option<StudentInfo>,
}

/// 服务端是否明确报告失败（`success=false`）
pub fn is_failure(raw: &Value) -> bool {
    raw.get("success").and_then(Value::as_bool) == Some(false)
}

/// 提取失败信息
pub fn failure_message(raw: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| raw.get(key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(_) => value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
}

/// 规范化列表类响应
///
/// # 参数
/// - `raw`: 原始响应，可以是数组、`{data: []}`、`{data: {data: []}}` 或 `{success: false}`
///
/// # 返回
/// 失败响应返回空记录和 `None` 统计，不会报错
pub fn normalize(raw: &Value) -> NormalizedResponse {
    if is_failure(raw) {
        debug!("响应 success=false，返回空结果");
        return NormalizedResponse::default();
    }

    let records: Vec<CourseGradeRecord> = first_match(RECORD_LIST_PROBES, raw)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_record).collect())
        .unwrap_or_default();

    let stats = first_match(STATS_PROBES, raw).map(|node| parse_stats(node, &aggregate(&records)));

    let student_info = first_match(STUDENT_INFO_PROBES, raw)
        .map(parse_student_info)
        .filter(|info| !info.is_empty());

    debug!(
        "规范化完成: {} 条记录, 统计: {}",
        records.len(),
        if stats.is_some() { "有" } else { "无" }
    );

    NormalizedResponse {
        records,
        stats,
        student_info,
    }
}

/// 规范化单条记录类响应（新增、修改、改状态）
pub fn normalize_record(raw: &Value) -> Option<CourseGradeRecord> {
    if is_failure(raw) {
        return None;
    }
    first_match(SINGLE_RECORD_PROBES, raw).and_then(parse_record)
}
