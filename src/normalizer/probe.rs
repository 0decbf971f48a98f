//! 响应形状探针
//!
//! 每个探针是一条 JSON 路径加一个判定函数，按优先级依次尝试，第一个命中者胜出。

use serde_json::Value;
use tracing::debug;

/// 形状探针
#[derive(Debug, Clone, Copy)]
pub struct ShapeProbe {
    /// 用于日志
    pub name: &'static str,
    /// 从根节点出发的对象键路径，空路径表示根节点本身
    pub path: &'static [&'static str],
    /// 判定找到的节点是否可用
    pub accepts: fn(&Value) -> bool,
}

impl ShapeProbe {
    /// 沿路径取值并判定，不满足时返回 `None`
    pub fn extract<'a>(&self, raw: &'a Value) -> Option<&'a Value> {
        let node = self
            .path
            .iter()
            .try_fold(raw, |node, key| node.get(key))?;
        (self.accepts)(node).then_some(node)
    }
}

fn is_object_with_id(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| obj.contains_key("id") || obj.contains_key("_id"))
}

/// 成绩数组探针：`data.data` → `data` → 根数组 → 旧版 `grades` 字段
pub const RECORD_LIST_PROBES: &[ShapeProbe] = &[
    ShapeProbe {
        name: "data.data[]",
        path: &["data", "data"],
        accepts: Value::is_array,
    },
    ShapeProbe {
        name: "data[]",
        path: &["data"],
        accepts: Value::is_array,
    },
    ShapeProbe {
        name: "[]",
        path: &[],
        accepts: Value::is_array,
    },
    ShapeProbe {
        name: "data.grades[]",
        path: &["data", "grades"],
        accepts: Value::is_array,
    },
    ShapeProbe {
        name: "grades[]",
        path: &["grades"],
        accepts: Value::is_array,
    },
];

/// 单条成绩探针，用于新增/修改接口的返回
pub const SINGLE_RECORD_PROBES: &[ShapeProbe] = &[
    ShapeProbe {
        name: "data.data{}",
        path: &["data", "data"],
        accepts: is_object_with_id,
    },
    ShapeProbe {
        name: "data{}",
        path: &["data"],
        accepts: is_object_with_id,
    },
    ShapeProbe {
        name: "{}",
        path: &[],
        accepts: is_object_with_id,
    },
];

/// 统计探针：`data.stats` → `stats`
pub const STATS_PROBES: &[ShapeProbe] = &[
    ShapeProbe {
        name: "data.stats",
        path: &["data", "stats"],
        accepts: Value::is_object,
    },
    ShapeProbe {
        name: "stats",
        path: &["stats"],
        accepts: Value::is_object,
    },
];

/// 学生档案探针：`data.studentInfo` → `studentInfo`
pub const STUDENT_INFO_PROBES: &[ShapeProbe] = &[
    ShapeProbe {
        name: "data.studentInfo",
        path: &["data", "studentInfo"],
        accepts: Value::is_object,
    },
    ShapeProbe {
        name: "studentInfo",
        path: &["studentInfo"],
        accepts: Value::is_object,
    },
];

/// 依次尝试探针，返回第一个命中的节点
pub fn first_match<'a>(probes: &[ShapeProbe], raw: &'a Value) -> Option<&'a Value> {
    probes.iter().find_map(|probe| {
        let node = probe.extract(raw)?;
        debug!("响应形状命中探针: {}", probe.name);
        Some(node)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_data_wins_over_flat() {
        let raw = json!({"data": {"data": [1, 2]}});
        assert_eq!(first_match(RECORD_LIST_PROBES, &raw), Some(&json!([1, 2])));

        let raw = json!({"data": [3]});
        assert_eq!(first_match(RECORD_LIST_PROBES, &raw), Some(&json!([3])));

        let raw = json!([4]);
        assert_eq!(first_match(RECORD_LIST_PROBES, &raw), Some(&json!([4])));
    }

    #[test]
    fn test_probe_rejects_wrong_node_type() {
        // data 是对象但 data.data 不是数组，继续尝试后面的探针
        let raw = json!({"data": {"data": "oops", "grades": [5]}});
        assert_eq!(first_match(RECORD_LIST_PROBES, &raw), Some(&json!([5])));

        let raw = json!({"data": {"total": 0}});
        assert_eq!(first_match(RECORD_LIST_PROBES, &raw), None);
    }

    #[test]
    fn test_stats_prefers_nested() {
        let raw = json!({"stats": {"gpa": 1.0}, "data": {"stats": {"gpa": 3.0}}});
        assert_eq!(first_match(STATS_PROBES, &raw), Some(&json!({"gpa": 3.0})));
    }

    #[test]
    fn test_single_record_requires_identity() {
        let raw = json!({"success": true, "data": {"_id": "g1"}});
        assert_eq!(first_match(SINGLE_RECORD_PROBES, &raw), Some(&json!({"_id": "g1"})));

        let raw = json!({"success": true, "message": "ok"});
        assert_eq!(first_match(SINGLE_RECORD_PROBES, &raw), None);
    }
}
