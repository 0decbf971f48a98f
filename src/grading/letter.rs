//! 字母等级与定性等级
//!
//! 三张阈值表互相独立：字母等级、10 分制定性等级、4 分制 GPA 定性等级，
//! 均从上往下匹配，先命中者胜出。

use serde::{Deserialize, Serialize};

/// 字母等级，声明顺序即高低顺序（F 最低）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    F,
    D,
    #[serde(rename = "D+")]
    DPlus,
    C,
    #[serde(rename = "C+")]
    CPlus,
    B,
    #[serde(rename = "B+")]
    BPlus,
    A,
    #[serde(rename = "A+")]
    APlus,
}

const LETTER_THRESHOLDS: &[(f64, LetterGrade)] = &[
    (9.0, LetterGrade::APlus),
    (8.5, LetterGrade::A),
    (8.0, LetterGrade::BPlus),
    (7.0, LetterGrade::B),
    (6.5, LetterGrade::CPlus),
    (5.5, LetterGrade::C),
    (5.0, LetterGrade::DPlus),
    (4.0, LetterGrade::D),
];

impl LetterGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }

    /// 4 分制绩点
    pub fn grade_points(self) -> f64 {
        match self {
            LetterGrade::APlus => 4.0,
            LetterGrade::A => 3.7,
            LetterGrade::BPlus => 3.5,
            LetterGrade::B => 3.0,
            LetterGrade::CPlus => 2.5,
            LetterGrade::C => 2.0,
            LetterGrade::DPlus => 1.5,
            LetterGrade::D => 1.0,
            LetterGrade::F => 0.0,
        }
    }

    pub fn is_passing(self) -> bool {
        self != LetterGrade::F
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 定性等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcademicBand {
    /// Xuất sắc
    Excellent,
    /// Giỏi
    Good,
    /// Khá
    Fair,
    /// Trung bình
    Average,
    /// Yếu
    Weak,
}

impl AcademicBand {
    pub fn label(self) -> &'static str {
        match self {
            AcademicBand::Excellent => "Xuất sắc",
            AcademicBand::Good => "Giỏi",
            AcademicBand::Fair => "Khá",
            AcademicBand::Average => "Trung bình",
            AcademicBand::Weak => "Yếu",
        }
    }
}

impl std::fmt::Display for AcademicBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const SCORE_BANDS: &[(f64, AcademicBand)] = &[
    (8.5, AcademicBand::Excellent),
    (7.0, AcademicBand::Good),
    (5.5, AcademicBand::Fair),
    (4.0, AcademicBand::Average),
];

const GPA_BANDS: &[(f64, AcademicBand)] = &[
    (3.6, AcademicBand::Excellent),
    (3.2, AcademicBand::Good),
    (2.5, AcademicBand::Fair),
    (2.0, AcademicBand::Average),
];

fn first_match<T: Copy>(table: &[(f64, T)], value: f64, fallback: T) -> T {
    table
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, item)| *item)
        .unwrap_or(fallback)
}

/// 10 分制总评分 → 字母等级
pub fn letter_for(score: f64) -> LetterGrade {
    first_match(LETTER_THRESHOLDS, score, LetterGrade::F)
}

/// 10 分制总评分 → 定性等级
pub fn band_for_score(score: f64) -> AcademicBand {
    first_match(SCORE_BANDS, score, AcademicBand::Weak)
}

/// 4 分制 GPA → 定性等级
pub fn band_for_gpa(gpa: f64) -> AcademicBand {
    first_match(GPA_BANDS, gpa, AcademicBand::Weak)
}

/// 10 分制总评分 → 4 分制绩点
pub fn grade_points(score: f64) -> f64 {
    letter_for(score).grade_points()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_boundaries() {
        let cases = [
            (10.0, "A+"),
            (9.0, "A+"),
            (8.99, "A"),
            (8.5, "A"),
            (8.0, "B+"),
            (7.0, "B"),
            (6.5, "C+"),
            (5.5, "C"),
            (5.0, "D+"),
            (4.0, "D"),
            (3.99, "F"),
            (0.0, "F"),
        ];
        for (score, expected) in cases {
            assert_eq!(letter_for(score).as_str(), expected, "score {}", score);
        }
    }

    #[test]
    fn test_letter_is_monotonic_and_pure() {
        let mut previous = letter_for(10.0);
        let mut score = 10.0;
        while score >= 0.0 {
            let letter = letter_for(score);
            assert!(letter <= previous, "{} ranked above {} at {}", letter, previous, score);
            assert_eq!(letter, letter_for(score));
            previous = letter;
            score -= 0.05;
        }
    }

    #[test]
    fn test_score_band_uses_its_own_cut_points() {
        // 8.0 是 B+，但定性等级仍是 Giỏi
        assert_eq!(letter_for(8.0), LetterGrade::BPlus);
        assert_eq!(band_for_score(8.0).label(), "Giỏi");
        assert_eq!(band_for_score(8.5).label(), "Xuất sắc");
        assert_eq!(band_for_score(7.0).label(), "Giỏi");
        assert_eq!(band_for_score(6.9).label(), "Khá");
        assert_eq!(band_for_score(5.0).label(), "Trung bình");
        assert_eq!(band_for_score(3.9).label(), "Yếu");
    }

    #[test]
    fn test_gpa_band() {
        assert_eq!(band_for_gpa(3.6).label(), "Xuất sắc");
        assert_eq!(band_for_gpa(3.59).label(), "Giỏi");
        assert_eq!(band_for_gpa(3.2).label(), "Giỏi");
        assert_eq!(band_for_gpa(2.5).label(), "Khá");
        assert_eq!(band_for_gpa(2.0).label(), "Trung bình");
        assert_eq!(band_for_gpa(1.2).label(), "Yếu");
    }

    #[test]
    fn test_letter_serializes_as_display_string() {
        assert_eq!(serde_json::to_string(&LetterGrade::CPlus).unwrap(), "\"C+\"");
        assert_eq!(serde_json::to_string(&LetterGrade::F).unwrap(), "\"F\"");
    }
}
