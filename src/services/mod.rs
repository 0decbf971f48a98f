pub mod grade_controller;

pub use grade_controller::{
    student_cache_key, GradeController, GradeViewState, LoadPhase, StudentSummary,
};
