//! 聚合引擎
//!
//! - `overview` - 全局计数、学分与分数分布
//! - `semester` - 学期分组与学期汇总
//! - `fallback` - GPA 统计的回退链

pub mod fallback;
pub mod overview;
pub mod semester;

pub use fallback::{resolve_stats, ResolvedStats, StatsSource};
pub use overview::{aggregate, score_stats};
pub use semester::{
    group_by_semester, parse_year, semester_summaries, SemesterGroup, UNSPECIFIED_SEMESTER,
};
