/// 日志工具模块
///
/// 提供日志格式化和会话日志文件的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;

use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::TokenUsage;

/// 初始化会话日志文件（覆盖写入表头）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\nMCQ 生成会话日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| AppError::io(log_file_path, e))
}

/// 向会话日志追加一行，自动加上时间前缀
pub fn append_log_line(log_file_path: &str, line: &str) -> AppResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| AppError::io(log_file_path, e))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        line
    )
    .map_err(|e| AppError::io(log_file_path, e))
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 MCQ 生成器启动");
    info!("🤖 模型: {} (temperature {})", config.llm_model_name, config.temperature);
    info!(
        "🔑 API Key: {}",
        if config.llm_api_key.is_some() { "已配置" } else { "未配置" }
    );
    info!("📁 下载目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// 记录一次生成的用量
pub fn log_usage(usage: &TokenUsage) {
    info!(
        "📊 用量: 共 {} tokens (prompt {}, completion {}), 费用 ${:.4}",
        usage.total_tokens, usage.prompt_tokens, usage.completion_tokens, usage.total_cost
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
