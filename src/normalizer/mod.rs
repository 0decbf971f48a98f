//! 响应规范化层
//!
//! - `probe` - 按优先级排列的形状探针
//! - `fields` - 字段别名与宽松类型转换
//! - `record` - 成绩记录 / 统计块 / 学生档案解析
//! - `response` - 对外的 `normalize` 入口

pub mod fields;
pub mod probe;
pub mod record;
pub mod response;

pub use probe::ShapeProbe;
pub use record::{parse_record, parse_stats, parse_student_info};
pub use response::{failure_message, is_failure, normalize, normalize_record, NormalizedResponse};
