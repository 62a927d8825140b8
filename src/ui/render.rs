//! 结果渲染
//!
//! 把会话中的内容渲染为终端文本

use std::fmt::Write;

use crate::models::{table_rows, McqRow, Subject, Tone};
use crate::services::{GenerationOutput, CSV_FILE_NAME, JSON_FILE_NAME, MAX_QUESTIONS, MIN_QUESTIONS};
use crate::workflow::{ErrorReport, SessionCtx};

/// 表格单元格最多显示的字符数
const MAX_CELL_WIDTH: usize = 60;

pub fn render_banner() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📚 MCQ Generator App");
    let _ = writeln!(out, "从 PDF 或 TXT 文件生成选择题，输入 help 查看命令");
    out
}

pub fn render_help() -> String {
    let subjects = Subject::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join(", ");
    let tones = Tone::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    let _ = writeln!(out, "命令:");
    let _ = writeln!(out, "  file <路径>        上传 PDF 或 TXT 文件");
    let _ = writeln!(out, "  count <n>          题目数量 ({}-{})", MIN_QUESTIONS, MAX_QUESTIONS);
    let _ = writeln!(out, "  subject <名称|序号> 科目: {}", subjects);
    let _ = writeln!(out, "  tone <名称|序号>    难度: {}", tones);
    let _ = writeln!(out, "  generate           生成题目");
    let _ = writeln!(out, "  retry              重新执行失败的请求");
    let _ = writeln!(out, "  show               显示文件内容");
    let _ = writeln!(out, "  save [目录]        下载 {} 和 {}", CSV_FILE_NAME, JSON_FILE_NAME);
    let _ = writeln!(out, "  status             查看当前表单");
    let _ = writeln!(out, "  reset              清空会话");
    let _ = writeln!(out, "  quit               退出");
    out
}

pub fn render_status(ctx: &SessionCtx) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Configuration ==");
    let _ = writeln!(out, "File: {}", ctx.file_name.as_deref().unwrap_or("(未上传)"));
    let _ = writeln!(out, "Number of MCQs: {}", ctx.mcq_count);
    let _ = writeln!(out, "Subject: {}", ctx.subject);
    let _ = writeln!(out, "Tone: {}", ctx.tone);
    let _ = writeln!(out, "Phase: {:?}{}", ctx.phase(), if ctx.is_pending() { " (pending)" } else { "" });
    out
}

pub fn render_file_content(ctx: &SessionCtx) -> String {
    match &ctx.text {
        Some(text) => format!("== File Content ==\n{}\n", text),
        None => "尚未上传文件\n".to_string(),
    }
}

/// 渲染生成结果：点评、表格（有行时）、下载提示、用量
pub fn render_result(output: &GenerationOutput) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "== Quiz Analysis ==");
    let _ = writeln!(out, "{}", output.review);

    if let Some(rows) = table_rows(&output.quiz) {
        let _ = writeln!(out);
        let _ = writeln!(out, "== Generated MCQs ==");
        out.push_str(&render_table(&rows));
        let _ = writeln!(
            out,
            "输入 save [目录] 下载 {} / {}",
            CSV_FILE_NAME, JSON_FILE_NAME
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "== Token Usage ==");
    for line in output.usage.display_lines() {
        let _ = writeln!(out, "{}", line);
    }
    out
}

pub fn render_error(report: &ErrorReport) -> String {
    let mut out = format!("❌ An error occurred: {}\n", report.message);
    if let Some(detail) = &report.detail {
        let _ = writeln!(out, "{}", detail);
    }
    out
}

/// 简单的定宽文本表格
pub fn render_table(rows: &[McqRow]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            [
                i.to_string(),
                clip(&row.mcq),
                clip(&row.choices),
                clip(&row.correct),
            ]
        })
        .collect();

    let header = ["", McqRow::HEADERS[0], McqRow::HEADERS[1], McqRow::HEADERS[2]];
    let mut widths = header.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header.map(String::from), &widths);
    let separator = widths.map(|w| "-".repeat(w));
    let _ = writeln!(out, "{}", separator.join("-+-"));
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

fn clip(text: &str) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() > MAX_CELL_WIDTH {
        single_line.chars().take(MAX_CELL_WIDTH - 1).collect::<String>() + "…"
    } else {
        single_line
    }
}
