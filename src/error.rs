use thiserror::Error;

/// 应用程序错误类型
///
/// 每个变体只描述"哪一类失败"，底层细节放在 `detail` 字段中用于展示，
/// 不参与流程判断。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（缺少 API Key、配置值非法等）
    #[error("配置错误: {message}")]
    Config { message: String },

    /// 不支持的输入（文件类型、编码、表单取值）
    #[error("不支持的输入 ({file}): {reason}")]
    UnsupportedInput { file: String, reason: String },

    /// 远程 LLM 调用失败
    #[error("LLM API 调用失败 (模型: {model}): {message}")]
    RemoteCall {
        model: String,
        message: String,
        detail: Option<String>,
    },

    /// 模型返回内容无法解析或不符合约定结构
    #[error("响应解析失败: {message}")]
    ResponseParse {
        message: String,
        detail: Option<String>,
    },

    /// 文件读写错误
    #[error("文件操作失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config {
            message: message.into(),
        }
    }

    /// 创建不支持输入错误
    pub fn unsupported(file: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::UnsupportedInput {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// 创建远程调用错误，保留底层错误的调试信息
    pub fn remote_call(model: impl Into<String>, source: impl std::fmt::Debug + std::fmt::Display) -> Self {
        AppError::RemoteCall {
            model: model.into(),
            message: source.to_string(),
            detail: Some(format!("{:?}", source)),
        }
    }

    /// 创建响应解析错误
    pub fn response_parse(message: impl Into<String>, detail: Option<String>) -> Self {
        AppError::ResponseParse {
            message: message.into(),
            detail,
        }
    }

    /// 创建文件读写错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// 附加的诊断信息（仅用于展示）
    pub fn detail(&self) -> Option<String> {
        match self {
            AppError::RemoteCall { detail, .. } | AppError::ResponseParse { detail, .. } => {
                detail.clone()
            }
            AppError::Io { source, .. } => Some(format!("{:?}", source)),
            AppError::Config { .. } | AppError::UnsupportedInput { .. } => None,
        }
    }

    /// 错误类别名称，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config { .. } => "ConfigError",
            AppError::UnsupportedInput { .. } => "UnsupportedInput",
            AppError::RemoteCall { .. } => "RemoteCallError",
            AppError::ResponseParse { .. } => "ResponseParseError",
            AppError::Io { .. } => "IoError",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ResponseParse {
            message: format!("JSON解析失败: {}", err),
            detail: Some(format!("{:?}", err)),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
