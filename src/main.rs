use std::path::PathBuf;

use anyhow::{Context, Result};
use student_grades::aggregation::semester_summaries;
use student_grades::utils::logging;
use student_grades::{Config, FileStore, GradeController, HttpGradeClient, LocalCache};
use tracing::warn;

/// 用法: student_grades <学生ID> [配置文件.toml]
#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let student_id = args.next().context("缺少学生ID参数")?;
    let config_path = args.next().map(PathBuf::from);

    // 加载配置
    let config = Config::load(config_path.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config.api_base_url, &student_id);

    let client = HttpGradeClient::new(&config).context("创建 HTTP 客户端失败")?;
    let cache = LocalCache::new(FileStore::new(&config.cache_dir));
    let controller =
        GradeController::new(client, cache).with_cache_max_age(config.cache_max_age_ms);

    let summary = controller.student_summary(&student_id).await;
    if let Some(error) = controller.error() {
        warn!("⚠️ {}", error);
    }

    logging::log_overview(&summary.stats);
    for semester in semester_summaries(&summary.records) {
        logging::log_semester(&semester);
    }

    Ok(())
}
