//! 评分项权重分类与总评分计算

use crate::models::ScoreComponent;

/// 未匹配任何关键词时的权重
pub const DEFAULT_WEIGHT: f64 = 0.10;

/// 评分项权重类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightCategory {
    /// 出勤
    Attendance,
    /// 期中
    Midterm,
    /// 期末
    Final,
    /// 作业
    Assignment,
    /// 其他
    Other,
}

/// 按优先级排列，先匹配者胜出
const CATEGORY_KEYWORDS: &[(WeightCategory, &[&str])] = &[
    (
        WeightCategory::Attendance,
        &["attendance", "điểm danh", "chuyên cần"],
    ),
    (WeightCategory::Midterm, &["midterm", "giữa kỳ"]),
    (WeightCategory::Final, &["final", "cuối kỳ"]),
    (WeightCategory::Assignment, &["assignment", "bài tập"]),
];

impl WeightCategory {
    /// 权重
    pub fn weight(self) -> f64 {
        match self {
            WeightCategory::Attendance => 0.10,
            WeightCategory::Midterm => 0.30,
            WeightCategory::Final => 0.60,
            WeightCategory::Assignment => 0.10,
            WeightCategory::Other => DEFAULT_WEIGHT,
        }
    }

    /// 根据评分项名称分类（不区分大小写的子串匹配）
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
            .map(|(category, _)| *category)
            .unwrap_or(WeightCategory::Other)
    }
}

/// 计算加权总评分
///
/// 总评分 = Σ(score × weight) / Σ(weight)，只去掉浮点运算的尾差，不做舍入；
/// 空列表或权重和为 0 时返回 0。
pub fn compute_composite(components: &[ScoreComponent]) -> f64 {
    if components.is_empty() {
        return 0.0;
    }

    let (weighted_sum, weight_sum) =
        components
            .iter()
            .fold((0.0_f64, 0.0_f64), |(weighted, total), component| {
                let weight = WeightCategory::classify(&component.name).weight();
                (weighted + component.score * weight, total + weight)
            });

    if weight_sum == 0.0 {
        return 0.0;
    }

    strip_float_noise(weighted_sum / weight_sum)
}

/// 0.3 × 8 + 0.6 × 6 + 0.1 × 10 这类运算会得到 6.999999999999999
fn strip_float_noise(value: f64) -> f64 {
    const SCALE: f64 = 1e9;
    (value * SCALE).round() / SCALE
}
