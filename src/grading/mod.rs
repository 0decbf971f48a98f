//! 成绩计算引擎
//!
//! - `weights` - 评分项权重分类与加权总评分
//! - `letter` - 字母等级、定性等级与绩点换算

pub mod letter;
pub mod weights;

pub use letter::{band_for_gpa, band_for_score, grade_points, letter_for, AcademicBand, LetterGrade};
pub use weights::{compute_composite, WeightCategory, DEFAULT_WEIGHT};
