//! 导出服务 - 业务能力层
//!
//! 只负责"写下载文件"能力：mcqs.csv 与 mcqs.json

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::McqRow;

pub const CSV_FILE_NAME: &str = "mcqs.csv";
pub const JSON_FILE_NAME: &str = "mcqs.json";

/// 已写出的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

/// 把表格行编码为 CSV（UTF-8，含表头）
pub fn rows_to_csv(rows: &[McqRow]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    // 没有数据行时 serialize 不会写表头，这里统一手动写
    writer
        .write_record(McqRow::HEADERS)
        .map_err(|e| csv_error(e.to_string()))?;
    for row in rows {
        writer
            .write_record([&row.mcq, &row.choices, &row.correct])
            .map_err(|e| csv_error(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| csv_error(e.to_string()))
}

/// 导出服务
pub struct ExportService {
    output_dir: PathBuf,
}

impl ExportService {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 写出两个下载文件
    ///
    /// JSON 文件内容与模型返回的题目字符串逐字节一致，不重新序列化
    pub async fn save(&self, rows: &[McqRow], quiz_json: &str) -> AppResult<ExportedFiles> {
        let dir_display = self.output_dir.display().to_string();
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::io(&dir_display, e))?;

        let csv_path = self.output_dir.join(CSV_FILE_NAME);
        let json_path = self.output_dir.join(JSON_FILE_NAME);

        let csv_bytes = rows_to_csv(rows)?;
        debug!("写入 CSV: {} 行, {} 字节", rows.len(), csv_bytes.len());
        fs::write(&csv_path, csv_bytes)
            .await
            .map_err(|e| AppError::io(csv_path.display().to_string(), e))?;

        fs::write(&json_path, quiz_json.as_bytes())
            .await
            .map_err(|e| AppError::io(json_path.display().to_string(), e))?;

        info!("✓ 已保存 {} 和 {} 到 {}", CSV_FILE_NAME, JSON_FILE_NAME, dir_display);

        Ok(ExportedFiles {
            csv_path,
            json_path,
        })
    }
}

fn csv_error(message: String) -> AppError {
    AppError::io(
        CSV_FILE_NAME,
        std::io::Error::new(std::io::ErrorKind::Other, message),
    )
}
