//! 数据访问接口
//!
//! 所有方法都返回服务端的原始 JSON，形状由规范化层处理。
//! `Err` 只表示传输层失败；`success=false` 的响应以 `Ok` 返回。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;
use crate::models::{GradeFilters, GradeInput, GradePatch, GradeStatus};

/// 成绩数据访问接口
#[async_trait]
pub trait GradeApi: Send + Sync {
    async fn fetch_grades(&self, filters: &GradeFilters) -> AppResult<Value>;
    async fn create_grade(&self, input: &GradeInput) -> AppResult<Value>;
    async fn patch_grade(&self, id: &str, patch: &GradePatch) -> AppResult<Value>;
    async fn delete_grade(&self, id: &str) -> AppResult<Value>;
    async fn patch_grade_status(&self, id: &str, status: GradeStatus) -> AppResult<Value>;
    async fn fetch_student_grades(&self, student_id: &str) -> AppResult<Value>;
}

#[async_trait]
impl<A: GradeApi + ?Sized> GradeApi for Arc<A> {
    async fn fetch_grades(&self, filters: &GradeFilters) -> AppResult<Value> {
        (**self).fetch_grades(filters).await
    }

    async fn create_grade(&self, input: &GradeInput) -> AppResult<Value> {
        (**self).create_grade(input).await
    }

    async fn patch_grade(&self, id: &str, patch: &GradePatch) -> AppResult<Value> {
        (**self).patch_grade(id, patch).await
    }

    async fn delete_grade(&self, id: &str) -> AppResult<Value> {
        (**self).delete_grade(id).await
    }

    async fn patch_grade_status(&self, id: &str, status: GradeStatus) -> AppResult<Value> {
        (**self).patch_grade_status(id, status).await
    }

    async fn fetch_student_grades(&self, student_id: &str) -> AppResult<Value> {
        (**self).fetch_student_grades(student_id).await
    }
}
