use std::path::Path;

use serde::Deserialize;

use crate::cache::DEFAULT_MAX_AGE_MS;
use crate::error::{AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// 成绩服务的基础地址
    pub api_base_url: String,
    /// 访问令牌（Bearer）
    pub api_token: Option<String>,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 文件缓存目录
    pub cache_dir: String,
    /// 缓存有效期（毫秒）
    pub cache_max_age_ms: i64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            cache_dir: ".grade_cache".to_string(),
            cache_max_age_ms: DEFAULT_MAX_AGE_MS,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件结构，所有字段均可省略
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    api_token: Option<String>,
    request_timeout_secs: Option<u64>,
    cache_dir: Option<String>,
    cache_max_age_ms: Option<i64>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 从环境变量读取配置，缺失或无法解析的值使用默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|err| match err {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
            .into(),
            other => other.into(),
        })
    }

    /// 先读取配置文件（如果提供），再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: String::new(),
                source,
            })?;
        let default = Self::default();
        Ok(Self {
            api_base_url: file.api_base_url.unwrap_or(default.api_base_url),
            api_token: file.api_token.or(default.api_token),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
            cache_dir: file.cache_dir.unwrap_or(default.cache_dir),
            cache_max_age_ms: file.cache_max_age_ms.unwrap_or(default.cache_max_age_ms),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
        })
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("GRADES_API_BASE_URL").unwrap_or(self.api_base_url),
            api_token: std::env::var("GRADES_API_TOKEN").ok().or(self.api_token),
            request_timeout_secs: env_parse("GRADES_REQUEST_TIMEOUT_SECS")
                .unwrap_or(self.request_timeout_secs),
            cache_dir: std::env::var("GRADES_CACHE_DIR").unwrap_or(self.cache_dir),
            cache_max_age_ms: env_parse("GRADES_CACHE_MAX_AGE_MS")
                .unwrap_or(self.cache_max_age_ms),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }
}

/// 读取并解析环境变量，缺失或无法解析时返回 `None`
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_toml_partial_fields_keep_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "https://sis.example.edu/api"
            cache_max_age_ms = 60000
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://sis.example.edu/api");
        assert_eq!(config.cache_max_age_ms, 60_000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.cache_dir, ".grade_cache");
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_toml_file_parse_error_carries_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache_max_age_ms = \"soon\"").unwrap();

        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_toml_file(Path::new("/nonexistent/grades.toml")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Config(ConfigError::FileReadFailed { .. })
        ));
    }
}
