//! # Student Grades
//!
//! 学生成绩客户端的核心：把形状各异的服务端响应整理成稳定的本地模型，
//! 计算总评分、字母等级、GPA 与学分统计，并用带有效期的本地缓存减少重复请求。
//!
//! ## 架构设计
//!
//! ### ① 数据访问层（Clients）
//! - `clients/` - `GradeApi` 接口与基于 reqwest 的 `HttpGradeClient`，只返回原始 JSON
//!
//! ### ② 纯计算层
//! - `normalizer/` - 形状探针，把原始响应规范化为 `CourseGradeRecord` 与统计
//! - `grading/` - 加权总评分、字母等级、定性等级
//! - `aggregation/` - 概览统计、学期分组、GPA 回退链
//!
//! ### ③ 缓存层（Cache）
//! - `cache/` - 键值存储 + 写入时间戳，读取时判断是否过期
//!
//! ### ④ 状态层（Services）
//! - `services/` - `GradeController`，持有成绩列表与统计快照，对外提供增删改查
//!
//! ## 模块结构

pub mod aggregation;
pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod grading;
pub mod models;
pub mod normalizer;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use cache::{FileStore, LocalCache, MemoryStore};
pub use clients::{GradeApi, HttpGradeClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CourseGradeRecord, GradeFilters, GradeStatus, OverviewSnapshot};
pub use normalizer::{normalize, NormalizedResponse};
pub use services::{GradeController, StudentSummary};
