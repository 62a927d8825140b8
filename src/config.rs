use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// 存放 API Key 的环境变量
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    /// API 密钥（生成时必须存在）
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub temperature: f32,
    /// 是否严格校验模型返回的题目结构
    pub strict_schema: bool,
    /// 下载文件（mcqs.csv / mcqs.json）的默认目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 会话日志文件（可选）
    pub session_log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-3.5-turbo".to_string(),
            temperature: 0.5,
            strict_schema: true,
            output_dir: ".".to_string(),
            verbose_logging: false,
            session_log_file: None,
        }
    }
}

/// TOML 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    model_name: Option<String>,
    temperature: Option<f32>,
    strict_schema: Option<bool>,
    output_dir: Option<String>,
    verbose_logging: Option<bool>,
    session_log_file: Option<String>,
}

impl Config {
    /// 加载配置：默认值 → `MCQ_CONFIG` 指向的 TOML 文件 → 环境变量
    pub fn load() -> Result<Self> {
        let base = match std::env::var("MCQ_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env()?)
    }

    /// 只从环境变量加载
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env()
    }

    /// 从 TOML 文件加载，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content)?;
        let default = Self::default();
        Ok(Self {
            llm_api_key: None,
            llm_api_base_url: file.api_base_url.unwrap_or(default.llm_api_base_url),
            llm_model_name: file.model_name.unwrap_or(default.llm_model_name),
            temperature: file.temperature.unwrap_or(default.temperature),
            strict_schema: file.strict_schema.unwrap_or(default.strict_schema),
            output_dir: file.output_dir.unwrap_or(default.output_dir),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
            session_log_file: file.session_log_file.or(default.session_log_file),
        })
    }

    /// 用环境变量覆盖当前配置
    fn with_env(self) -> AppResult<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// 用 `lookup` 提供的变量覆盖当前配置，空值视为未设置
    ///
    /// 无法解析的值返回配置错误，错误信息中带上变量名
    fn with_vars<F>(self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let temperature = match var("MCQ_TEMPERATURE") {
            Some(v) => parse_temperature("MCQ_TEMPERATURE", &v)?,
            None => self.temperature,
        };
        let strict_schema = match var("MCQ_STRICT_SCHEMA") {
            Some(v) => parse_bool("MCQ_STRICT_SCHEMA", &v)?,
            None => self.strict_schema,
        };
        let verbose_logging = match var("MCQ_VERBOSE_LOGGING") {
            Some(v) => parse_bool("MCQ_VERBOSE_LOGGING", &v)?,
            None => self.verbose_logging,
        };

        Ok(Self {
            llm_api_key: var(API_KEY_ENV).or(self.llm_api_key),
            llm_api_base_url: var("OPENAI_API_BASE").unwrap_or(self.llm_api_base_url),
            llm_model_name: var("MCQ_MODEL_NAME").unwrap_or(self.llm_model_name),
            temperature,
            strict_schema,
            output_dir: var("MCQ_OUTPUT_DIR").unwrap_or(self.output_dir),
            verbose_logging,
            session_log_file: var("MCQ_SESSION_LOG").or(self.session_log_file),
        })
    }

    /// 取出 API Key，不存在时返回配置错误
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.llm_api_key.as_deref().ok_or_else(|| {
            AppError::config(format!(
                "未找到 OpenAI API Key，请检查环境变量 {}",
                API_KEY_ENV
            ))
        })
    }
}

/// 解析布尔值，不区分大小写
fn parse_bool(name: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::config(format!(
            "环境变量 {} 的值无效: {:?}（应为 true 或 false）",
            name, value
        ))),
    }
}

/// 解析采样温度，范围 [0, 2]
fn parse_temperature(name: &str, value: &str) -> AppResult<f32> {
    match value.trim().parse::<f32>() {
        Ok(t) if (0.0..=2.0).contains(&t) => Ok(t),
        _ => Err(AppError::config(format!(
            "环境变量 {} 的值无效: {:?}（应为 0 到 2 之间的数字）",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm_model_name, "gpt-3.5-turbo");
        assert_eq!(config.temperature, 0.5);
        assert!(config.strict_schema);
        assert!(config.llm_api_key.is_none());
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = Config::from_toml_str(
            r#"
            model_name = "gpt-4o-mini"
            strict_schema = false
            output_dir = "downloads"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        assert!(!config.strict_schema);
        assert_eq!(config.output_dir, "downloads");
        // 未设置的字段保持默认
        assert_eq!(config.temperature, 0.5);
    }

    #[test]
    fn test_from_toml_str_rejects_bad_types() {
        assert!(Config::from_toml_str("temperature = \"hot\"").is_err());
    }

    #[test]
    fn test_require_api_key() {
        let mut config = Config::default();
        let err = config.require_api_key().unwrap_err();
        assert_eq!(err.kind(), "ConfigError");

        config.llm_api_key = Some("sk-test".to_string());
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_env_overrides_file_overrides_default() {
        let file = Config::from_toml_str(
            r#"
            model_name = "gpt-4o-mini"
            temperature = 0.9
            output_dir = "from-file"
            "#,
        )
        .unwrap();

        let config = file
            .with_vars(vars(&[
                ("MCQ_TEMPERATURE", "0.2"),
                ("OPENAI_API_KEY", "sk-env"),
            ]))
            .unwrap();

        // 环境变量优先
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.llm_api_key.as_deref(), Some("sk-env"));
        // 文件中的值覆盖默认值
        assert_eq!(config.llm_model_name, "gpt-4o-mini");
        assert_eq!(config.output_dir, "from-file");
        // 两处都没设置的保持默认
        assert!(config.strict_schema);
        assert_eq!(config.llm_api_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_bool_vars_are_case_insensitive() {
        let config = Config::default()
            .with_vars(vars(&[
                ("MCQ_STRICT_SCHEMA", "False"),
                ("MCQ_VERBOSE_LOGGING", "TRUE"),
            ]))
            .unwrap();
        assert!(!config.strict_schema);
        assert!(config.verbose_logging);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = Config::default()
            .with_vars(vars(&[("MCQ_TEMPERATURE", "hot")]))
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
        assert!(err.to_string().contains("MCQ_TEMPERATURE"));

        let err = Config::default()
            .with_vars(vars(&[("MCQ_TEMPERATURE", "3.5")]))
            .unwrap_err();
        assert!(err.to_string().contains("MCQ_TEMPERATURE"));

        let err = Config::default()
            .with_vars(vars(&[("MCQ_STRICT_SCHEMA", "maybe")]))
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
        assert!(err.to_string().contains("MCQ_STRICT_SCHEMA"));
    }

    #[test]
    fn test_blank_vars_are_ignored() {
        let config = Config::default()
            .with_vars(vars(&[("OPENAI_API_KEY", "  "), ("MCQ_TEMPERATURE", "")]))
            .unwrap();
        assert!(config.llm_api_key.is_none());
        assert_eq!(config.temperature, 0.5);
    }
}
