use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// 支持上传的文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    /// 按扩展名判断（忽略大小写）
    pub fn from_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|s| s.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "txt" => Some(FileKind::Text),
            _ => None,
        }
    }
}

/// 读取上传文件并提取文本
///
/// 只支持 PDF 和纯文本，其余类型返回 `UnsupportedInput`
pub async fn read_file(path: &Path) -> AppResult<String> {
    let file_label = path.display().to_string();
    // 先检查类型，不支持的文件不去读
    if FileKind::from_name(&file_label).is_none() {
        return Err(unsupported_format(&file_label));
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::io(&file_label, e))?;

    info!("正在读取文件: {} ({} 字节)", file_label, bytes.len());
    read_bytes(&file_label, bytes).await
}

/// 从内存中的上传内容提取文本
pub async fn read_bytes(file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
    match FileKind::from_name(file_name) {
        Some(FileKind::Text) => String::from_utf8(bytes).map_err(|e| {
            AppError::unsupported(file_name, format!("文本文件不是有效的 UTF-8: {}", e))
        }),
        Some(FileKind::Pdf) => extract_pdf_text(file_name, bytes).await,
        None => Err(unsupported_format(file_name)),
    }
}

/// 提取 PDF 各页文本并拼接
///
/// 解析放在阻塞线程中执行，解析器 panic 也按不支持的输入处理
async fn extract_pdf_text(file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
    let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::unsupported(file_name, format!("PDF 解析中断: {}", e)))?;

    let text = result
        .map_err(|e| AppError::unsupported(file_name, format!("无法解析 PDF: {:?}", e)))?;

    debug!("PDF 提取完成，共 {} 个字符", text.chars().count());
    Ok(text)
}

fn unsupported_format(file_name: &str) -> AppError {
    AppError::unsupported(file_name, "仅支持 PDF 和 TXT 文件")
}
