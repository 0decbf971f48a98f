use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据访问错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 本地缓存错误
    #[error("缓存错误: {0}")]
    Cache(#[from] CacheError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 数据访问错误
///
/// `Transport` 表示调用本身失败，`Semantic` 表示调用成功但服务端返回 `success=false`。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 服务端报告失败
    #[error("API返回失败 ({endpoint}): {message}")]
    Semantic { endpoint: String, message: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 本地缓存错误
#[derive(Debug, Error)]
pub enum CacheError {
    /// 读写存储失败
    #[error("存储读写失败 ({key}): {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("缓存序列化失败 ({key}): {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 服务地址无法作为请求的基础地址
    #[error("无效的服务地址 '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Cache(CacheError::Io {
            key: String::new(),
            source: err,
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(),
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建传输层失败错误
    pub fn transport(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::Transport {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建语义失败错误（服务端返回 `success=false`）
    pub fn semantic(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Api(ApiError::Semantic {
            endpoint: endpoint.into(),
            message: message.into(),
        })
    }

    /// 是否为服务端报告的失败
    pub fn is_semantic(&self) -> bool {
        matches!(self, AppError::Api(ApiError::Semantic { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
