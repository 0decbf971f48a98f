pub mod grade;
pub mod request;
pub mod stats;

pub use grade::{CourseGradeRecord, CourseRef, GradeStatus, ScoreComponent, SemesterInfo};
pub use request::{GradeFilters, GradeInput, GradePatch};
pub use stats::{OverviewSnapshot, ScoreStats, SemesterSummary, StudentInfo};
