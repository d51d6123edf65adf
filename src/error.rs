use thiserror::Error;

/// 应用程序错误类型
///
/// 挑战引擎本身没有错误路径（答错、超时都是正常的状态迁移），
/// 这里只覆盖配置、文件、目录和运行时环境
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 话题目录错误
    #[error("目录错误: {0}")]
    Catalog(#[from] CatalogError),
    /// 运行时环境错误（例如不在 tokio 运行时内创建会话）
    #[error("运行时错误: {0}")]
    Runtime(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 话题目录错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 话题不存在
    #[error("话题不存在: {topic_id}")]
    TopicNotFound { topic_id: String },
    /// 话题不是计时挑战
    #[error("话题 {topic_id} 不是计时挑战")]
    NotAChallenge { topic_id: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 取值非法
    #[error("配置项 {field} 的值 '{value}' 非法")]
    InvalidValue { field: String, value: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建配置取值错误
    pub fn invalid_config(field: impl Into<String>, value: impl ToString) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
