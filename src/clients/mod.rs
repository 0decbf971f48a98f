pub mod grade_api;
pub mod http_client;

pub use grade_api::GradeApi;
pub use http_client::HttpGradeClient;
