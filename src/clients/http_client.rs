/// 成绩服务 HTTP 客户端
///
/// 封装所有与成绩 API 相关的调用逻辑
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::grade_api::GradeApi;
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{GradeFilters, GradeInput, GradePatch, GradeStatus};
use crate::utils::logging::truncate_text;

/// 成绩 API 客户端
pub struct HttpGradeClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpGradeClient {
    /// 创建新的成绩客户端
    ///
    /// `api_base_url` 必须是可以追加路径的绝对地址（如 `http://host/api`）。
    pub fn new(config: &Config) -> AppResult<Self> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: config.api_base_url.clone(),
            reason,
        };
        let base_url = Url::parse(&config.api_base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("不能追加路径".to_string()).into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::transport("client", e))?;

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone(),
        })
    }

    /// 在基础地址后追加路径段，每段单独做百分号编码
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // new() 已排除 cannot-be-a-base 的地址
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// 发送请求并把响应体解析为 JSON
    ///
    /// 非 2xx 的 JSON 响应照常返回，交给规范化层判断；响应体不是 JSON 时视为传输失败。
    async fn send(&self, endpoint: String, request: RequestBuilder) -> AppResult<Value> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!("请求: {}", endpoint);

        let response = request
            .send()
            .await
            .map_err(|e| AppError::transport(&endpoint, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::transport(&endpoint, e))?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                "响应不是 JSON ({}, HTTP {}): {}",
                endpoint,
                status,
                truncate_text(&body, 120)
            );
            AppError::transport(&endpoint, e)
        })
    }
}

#[async_trait]
impl GradeApi for HttpGradeClient {
    async fn fetch_grades(&self, filters: &GradeFilters) -> AppResult<Value> {
        let request = self
            .client
            .get(self.url(&["grades"]))
            .query(&filters.to_query());
        self.send("GET /grades".to_string(), request).await
    }

    async fn create_grade(&self, input: &GradeInput) -> AppResult<Value> {
        let request = self.client.post(self.url(&["grades"])).json(input);
        self.send("POST /grades".to_string(), request).await
    }

    async fn patch_grade(&self, id: &str, patch: &GradePatch) -> AppResult<Value> {
        let request = self.client.put(self.url(&["grades", id])).json(patch);
        self.send(format!("PUT /grades/{}", id), request).await
    }

    async fn delete_grade(&self, id: &str) -> AppResult<Value> {
        let request = self.client.delete(self.url(&["grades", id]));
        self.send(format!("DELETE /grades/{}", id), request).await
    }

    async fn patch_grade_status(&self, id: &str, status: GradeStatus) -> AppResult<Value> {
        let request = self
            .client
            .patch(self.url(&["grades", id, "status"]))
            .json(&json!({ "status": status }));
        self.send(format!("PATCH /grades/{}/status", id), request).await
    }

    async fn fetch_student_grades(&self, student_id: &str) -> AppResult<Value> {
        let request = self.client.get(self.url(&["grades", "student", student_id]));
        self.send(format!("GET /grades/student/{}", student_id), request)
            .await
    }
}
