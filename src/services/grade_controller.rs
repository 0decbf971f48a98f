//! 成绩状态控制器
//!
//! 持有内存中的成绩列表和统计快照，通过注入的 [`GradeApi`] 发起请求，
//! 结果经规范化后整体替换到状态里。
//!
//! ## 状态
//!
//! `Idle → Loading → Ready | Error`。同一个请求键在途时不会再发起第二次网络请求；
//! 不同的操作互不阻塞（刷新列表时可以新增成绩），列表以最后完成的写入为准。
//!
//! ## 错误
//!
//! 传输失败与 `success=false` 处理方式相同：状态不变，错误信息写入 `error`，
//! 操作返回中性值（`None` / `false` / 空列表）。需要具体错误类型时使用 `try_*` 版本。
//!
//! ## 统计
//!
//! 列表和统计只会一起变化。修改成功后，已知来源的统计按变化量增减，
//! 来源未知时才按本地列表重新计数。

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::aggregation::{
    aggregate, group_by_semester, resolve_stats, score_stats, semester_summaries, ResolvedStats,
    SemesterGroup, StatsSource,
};
use crate::cache::{Clock, KeyValueStore, LocalCache, SystemClock, DEFAULT_MAX_AGE_MS};
use crate::clients::GradeApi;
use crate::error::{AppError, AppResult};
use crate::grading::compute_composite;
use crate::models::{
    CourseGradeRecord, GradeFilters, GradeInput, GradePatch, GradeStatus, OverviewSnapshot,
    ScoreStats, SemesterSummary,
};
use crate::normalizer::{failure_message, is_failure, normalize, normalize_record};

/// 加载阶段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// 暴露给界面层的状态快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeViewState {
    pub records: Vec<CourseGradeRecord>,
    pub stats: Option<OverviewSnapshot>,
    pub stats_source: Option<StatsSource>,
    pub loading: bool,
    pub refreshing: bool,
    pub phase: LoadPhase,
    pub error: Option<String>,
    /// 填充当前列表的请求键
    pub source_key: Option<String>,
}

/// 学生成绩汇总，也是缓存的内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub records: Vec<CourseGradeRecord>,
    pub stats: ResolvedStats,
}

/// 学生汇总的缓存键
pub fn student_cache_key(student_id: &str) -> String {
    format!("grades:student:{}", student_id)
}

/// 在途请求标记，离开作用域时自动移除
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

/// 成绩状态控制器
pub struct GradeController<A, S, C = SystemClock> {
    api: A,
    cache: LocalCache<S, C>,
    cache_max_age_ms: i64,
    state: Mutex<GradeViewState>,
    in_flight: Mutex<HashSet<String>>,
}

impl<A, S, C> GradeController<A, S, C>
where
    A: GradeApi,
    S: KeyValueStore,
    C: Clock,
{
    /// 创建控制器
    pub fn new(api: A, cache: LocalCache<S, C>) -> Self {
        Self {
            api,
            cache,
            cache_max_age_ms: DEFAULT_MAX_AGE_MS,
            state: Mutex::new(GradeViewState::default()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// 设置学生汇总缓存的有效期
    pub fn with_cache_max_age(mut self, max_age_ms: i64) -> Self {
        self.cache_max_age_ms = max_age_ms;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &LocalCache<S, C> {
        &self.cache
    }

    // ========== 状态读取 ==========

    pub fn state(&self) -> GradeViewState {
        self.lock_state().clone()
    }

    pub fn records(&self) -> Vec<CourseGradeRecord> {
        self.lock_state().records.clone()
    }

    pub fn stats(&self) -> Option<OverviewSnapshot> {
        self.lock_state().stats.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock_state().error = None;
    }

    pub fn semester_groups(&self) -> Vec<SemesterGroup> {
        group_by_semester(&self.lock_state().records)
    }

    pub fn semester_summaries(&self) -> Vec<SemesterSummary> {
        semester_summaries(&self.lock_state().records)
    }

    pub fn score_stats(&self) -> Option<ScoreStats> {
        score_stats(&self.lock_state().records)
    }

    // ========== 列表 ==========

    /// 获取成绩列表
    ///
    /// 失败时返回空列表，持有的列表不变。相同请求进行中时返回当前持有的列表。
    pub async fn list(&self, filters: &GradeFilters) -> Vec<CourseGradeRecord> {
        self.try_list(filters).await.unwrap_or_else(|e| {
            self.record_failure(&e);
            Vec::new()
        })
    }

    pub async fn try_list(&self, filters: &GradeFilters) -> AppResult<Vec<CourseGradeRecord>> {
        let key = filters.request_key();
        let Some(_guard) = self.begin_request(&key) else {
            debug!("相同请求进行中，复用当前列表: {}", key);
            return Ok(self.records());
        };

        self.set_loading(false);
        let result = self.api.fetch_grades(filters).await;
        let raw = match check_response("GET /grades", result) {
            Ok(raw) => raw,
            Err(e) => {
                self.finish_with_error(&e);
                return Err(e);
            }
        };

        let normalized = normalize(&raw);
        let records = normalized.records;
        let mut state = self.lock_state();
        let resolved = resolve_stats(
            normalized.stats.as_ref(),
            state.stats.as_ref(),
            normalized.student_info.as_ref(),
            &records,
        );
        // 列表与统计同时替换
        state.records = records.clone();
        state.stats = Some(resolved.snapshot);
        state.stats_source = Some(resolved.source);
        state.source_key = Some(key);
        mark_ready(&mut state);
        drop(state);

        info!("✓ 已加载 {} 条成绩", records.len());
        Ok(records)
    }

    // ========== 修改 ==========

    /// 新增成绩，成功后插入列表头部
    pub async fn add(&self, input: &GradeInput) -> Option<CourseGradeRecord> {
        self.try_add(input).await.map_err(|e| self.record_failure(&e)).ok()
    }

    pub async fn try_add(&self, input: &GradeInput) -> AppResult<CourseGradeRecord> {
        let mut input = input.clone();
        if input.composite_score.is_none() && !input.components.is_empty() {
            input.composite_score = Some(compute_composite(&input.components));
        }

        let endpoint = "POST /grades";
        let raw = check_response(endpoint, self.api.create_grade(&input).await)?;
        let record = extract_record(endpoint, &raw)?;

        let mut state = self.lock_state();
        state.records.insert(0, record.clone());
        self.apply_change(&mut state, None, Some(&record));
        drop(state);

        info!("✓ 已新增成绩: {}", record.id);
        Ok(record)
    }

    /// 修改成绩，原位替换
    pub async fn update(&self, id: &str, patch: &GradePatch) -> Option<CourseGradeRecord> {
        self.try_update(id, patch)
            .await
            .map_err(|e| self.record_failure(&e))
            .ok()
    }

    pub async fn try_update(&self, id: &str, patch: &GradePatch) -> AppResult<CourseGradeRecord> {
        let mut patch = patch.clone();
        if patch.composite_score.is_none() {
            if let Some(components) = patch.components.as_deref().filter(|c| !c.is_empty()) {
                patch.composite_score = Some(compute_composite(components));
            }
        }

        let endpoint = format!("PUT /grades/{}", id);
        let raw = check_response(&endpoint, self.api.patch_grade(id, &patch).await)?;
        let record = extract_record(&endpoint, &raw)?;
        self.replace_in_place(id, &record);

        info!("✓ 已修改成绩: {}", id);
        Ok(record)
    }

    /// 修改成绩状态，原位替换
    pub async fn change_status(&self, id: &str, status: GradeStatus) -> Option<CourseGradeRecord> {
        self.try_change_status(id, status)
            .await
            .map_err(|e| self.record_failure(&e))
            .ok()
    }

    pub async fn try_change_status(
        &self,
        id: &str,
        status: GradeStatus,
    ) -> AppResult<CourseGradeRecord> {
        let endpoint = format!("PATCH /grades/{}/status", id);
        let raw = check_response(&endpoint, self.api.patch_grade_status(id, status).await)?;
        let record = extract_record(&endpoint, &raw)?;
        self.replace_in_place(id, &record);

        info!("✓ 成绩 {} 状态已改为 {}", id, status);
        Ok(record)
    }

    /// 删除成绩
    ///
    /// 服务端报告失败时返回 `false`，列表不变。
    pub async fn delete(&self, id: &str) -> bool {
        match self.try_delete(id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.record_failure(&e);
                false
            }
        }
    }

    /// 删除成绩，服务端报告失败时为 `Ok(false)`，传输失败为 `Err`
    pub async fn try_delete(&self, id: &str) -> AppResult<bool> {
        let endpoint = format!("DELETE /grades/{}", id);
        let raw = self.api.delete_grade(id).await?;
        if is_failure(&raw) {
            let message = failure_message(&raw).unwrap_or_else(|| "删除失败".to_string());
            warn!("⚠️ 删除成绩 {} 失败: {}", id, message);
            self.lock_state().error = Some(AppError::semantic(endpoint, message).to_string());
            return Ok(false);
        }

        let mut state = self.lock_state();
        state.error = None;
        match state.records.iter().position(|r| r.id == id) {
            Some(pos) => {
                let removed = state.records.remove(pos);
                self.apply_change(&mut state, Some(&removed), None);
            }
            None => debug!("删除的成绩 {} 不在当前列表中", id),
        }
        drop(state);

        info!("✓ 已删除成绩: {}", id);
        Ok(true)
    }

    // ========== 学生汇总 ==========

    /// 获取学生成绩汇总，优先使用未过期的缓存
    pub async fn student_summary(&self, student_id: &str) -> StudentSummary {
        let key = student_cache_key(student_id);
        if let Some(cached) = self
            .cache
            .get::<StudentSummary>(&key, Some(self.cache_max_age_ms))
        {
            info!("✓ 使用缓存的成绩汇总: {}", student_id);
            self.apply_summary(&key, &cached);
            return cached;
        }
        self.fetch_summary_or_empty(student_id, false).await
    }

    /// 跳过缓存，强制刷新学生成绩汇总
    pub async fn refresh_student_summary(&self, student_id: &str) -> StudentSummary {
        self.fetch_summary_or_empty(student_id, true).await
    }

    pub async fn try_student_summary(
        &self,
        student_id: &str,
        refreshing: bool,
    ) -> AppResult<StudentSummary> {
        let key = student_cache_key(student_id);
        let Some(_guard) = self.begin_request(&key) else {
            debug!("相同请求进行中，复用当前汇总: {}", key);
            return Ok(self.current_summary());
        };

        self.set_loading(refreshing);
        let endpoint = format!("GET /grades/student/{}", student_id);
        let result = self.api.fetch_student_grades(student_id).await;
        let raw = match check_response(&endpoint, result) {
            Ok(raw) => raw,
            Err(e) => {
                self.finish_with_error(&e);
                return Err(e);
            }
        };

        let normalized = normalize(&raw);
        let previous = self.stats().or_else(|| {
            // 过期的缓存仍然可以作为统计的回退来源
            self.cache
                .get::<StudentSummary>(&key, Some(i64::MAX))
                .map(|s| s.stats.snapshot)
        });
        let stats = resolve_stats(
            normalized.stats.as_ref(),
            previous.as_ref(),
            normalized.student_info.as_ref(),
            &normalized.records,
        );
        let summary = StudentSummary {
            records: normalized.records,
            stats,
        };

        self.apply_summary(&key, &summary);
        self.cache.put(&key, &summary);

        info!(
            "✓ 已加载学生 {} 的 {} 条成绩 (统计来源: {:?})",
            student_id,
            summary.records.len(),
            summary.stats.source
        );
        Ok(summary)
    }

    /// 失败时返回空汇总（GPA 未知），持有的状态不变
    async fn fetch_summary_or_empty(&self, student_id: &str, refreshing: bool) -> StudentSummary {
        self.try_student_summary(student_id, refreshing)
            .await
            .unwrap_or_else(|e| {
                self.record_failure(&e);
                StudentSummary {
                    records: Vec::new(),
                    stats: resolve_stats(None, None, None, &[]),
                }
            })
    }

    // ========== 内部辅助 ==========

    fn lock_state(&self) -> MutexGuard<'_, GradeViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin_request(&self, key: &str) -> Option<InFlightGuard<'_>> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(key.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            set: &self.in_flight,
            key: key.to_string(),
        })
    }

    fn set_loading(&self, refreshing: bool) {
        let mut state = self.lock_state();
        if refreshing {
            state.refreshing = true;
        } else {
            state.loading = true;
        }
        state.phase = LoadPhase::Loading;
    }

    fn finish_with_error(&self, err: &AppError) {
        let mut state = self.lock_state();
        state.loading = false;
        state.refreshing = false;
        state.phase = LoadPhase::Error(err.to_string());
    }

    fn record_failure(&self, err: &AppError) {
        warn!("⚠️ 成绩操作失败: {}", err);
        self.lock_state().error = Some(err.to_string());
    }

    fn current_summary(&self) -> StudentSummary {
        let state = self.lock_state();
        let records = state.records.clone();
        let stats = match (&state.stats, state.stats_source) {
            (Some(snapshot), Some(source)) => ResolvedStats {
                snapshot: snapshot.clone(),
                source,
            },
            _ => resolve_stats(None, None, None, &records),
        };
        StudentSummary { records, stats }
    }

    fn apply_summary(&self, key: &str, summary: &StudentSummary) {
        let mut state = self.lock_state();
        state.records = summary.records.clone();
        state.stats = Some(summary.stats.snapshot.clone());
        state.stats_source = Some(summary.stats.source);
        state.source_key = Some(key.to_string());
        mark_ready(&mut state);
    }

    fn replace_in_place(&self, id: &str, record: &CourseGradeRecord) {
        let mut state = self.lock_state();
        state.error = None;
        let Some(slot) = state.records.iter_mut().find(|r| r.id == id) else {
            debug!("成绩 {} 不在当前列表中，列表和统计不变", id);
            return;
        };
        let previous = std::mem::replace(slot, record.clone());
        self.apply_change(&mut state, Some(&previous), Some(record));
    }

    /// 列表变化之后同步统计和学生汇总缓存
    ///
    /// # 参数
    /// - `removed`: 从列表中移除（或被替换）的记录
    /// - `added`: 加入列表（或替换进来）的记录
    fn apply_change(
        &self,
        state: &mut GradeViewState,
        removed: Option<&CourseGradeRecord>,
        added: Option<&CourseGradeRecord>,
    ) {
        let (snapshot, source) = match (state.stats.take(), state.stats_source) {
            (Some(mut snapshot), Some(source)) if source != StatsSource::Unknown => {
                if let Some(record) = removed {
                    remove_from_snapshot(&mut snapshot, record);
                }
                if let Some(record) = added {
                    add_to_snapshot(&mut snapshot, record);
                }
                (snapshot, source)
            }
            _ => (aggregate(&state.records), StatsSource::Unknown),
        };
        state.stats = Some(snapshot);
        state.stats_source = Some(source);
        state.error = None;

        if let Some(key) = state.source_key.as_deref().filter(|k| k.starts_with("grades:student:")) {
            let summary = StudentSummary {
                records: state.records.clone(),
                stats: ResolvedStats {
                    snapshot: state.stats.clone().unwrap_or_default(),
                    source,
                },
            };
            self.cache.put(key, &summary);
        }
    }
}

fn status_counter(snapshot: &mut OverviewSnapshot, status: GradeStatus) -> &mut usize {
    match status {
        GradeStatus::Completed => &mut snapshot.completed_courses,
        GradeStatus::Pending => &mut snapshot.pending_courses,
        GradeStatus::Failed => &mut snapshot.failed_courses,
    }
}

fn add_to_snapshot(snapshot: &mut OverviewSnapshot, record: &CourseGradeRecord) {
    snapshot.total_courses += 1;
    snapshot.total_credits += record.credits();
    *status_counter(snapshot, record.status) += 1;
}

fn remove_from_snapshot(snapshot: &mut OverviewSnapshot, record: &CourseGradeRecord) {
    snapshot.total_courses = snapshot.total_courses.saturating_sub(1);
    snapshot.total_credits = (snapshot.total_credits - record.credits()).max(0.0);
    let counter = status_counter(snapshot, record.status);
    *counter = counter.saturating_sub(1);
}

fn mark_ready(state: &mut GradeViewState) {
    state.loading = false;
    state.refreshing = false;
    state.phase = LoadPhase::Ready;
    state.error = None;
}

/// 把 `success=false` 转为语义错误
fn check_response(endpoint: &str, result: AppResult<Value>) -> AppResult<Value> {
    let raw = result?;
    if is_failure(&raw) {
        let message = failure_message(&raw).unwrap_or_else(|| "请求失败".to_string());
        return Err(AppError::semantic(endpoint, message));
    }
    Ok(raw)
}

fn extract_record(endpoint: &str, raw: &Value) -> AppResult<CourseGradeRecord> {
    normalize_record(raw).ok_or_else(|| AppError::semantic(endpoint, "响应中没有成绩记录"))
}
