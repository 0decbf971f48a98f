//! 宽松取值工具：同一字段在不同版本的接口里可能有不同的名字和类型

use serde_json::Value;

/// 按顺序查找第一个存在且非 null 的字段
pub fn first_value<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(key))
        .find(|value| !value.is_null())
}

/// 数字或数字字符串
pub fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// 字符串或数字，空字符串视为缺失
pub fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn first_f64(item: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| item.get(key))
        .find_map(lenient_f64)
}

pub fn first_string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(key))
        .find_map(lenient_string)
}

pub fn first_usize(item: &Value, keys: &[&str]) -> Option<usize> {
    first_f64(item, keys)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(lenient_f64(&json!(3)), Some(3.0));
        assert_eq!(lenient_f64(&json!(" 7.5 ")), Some(7.5));
        assert_eq!(lenient_f64(&json!("abc")), None);
        assert_eq!(lenient_f64(&json!(null)), None);
    }

    #[test]
    fn test_first_f64_skips_unusable_aliases() {
        let item = json!({"compositeScore": null, "finalScore": "n/a", "totalScore": "8.5"});
        assert_eq!(
            first_f64(&item, &["compositeScore", "finalScore", "totalScore"]),
            Some(8.5)
        );
    }

    #[test]
    fn test_lenient_string() {
        assert_eq!(lenient_string(&json!(42)), Some("42".to_string()));
        assert_eq!(lenient_string(&json!("  ")), None);
        assert_eq!(first_string(&json!({"_id": "abc"}), &["id", "_id"]), Some("abc".to_string()));
    }
}
