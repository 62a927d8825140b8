//! 表单命令解析
//!
//! 每一行输入对应一次表单操作

use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::models::{Subject, Tone};

/// 表单命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 上传文件
    File(PathBuf),
    /// 题目数量
    Count(u8),
    Subject(Subject),
    Tone(Tone),
    /// 按当前表单生成
    Generate,
    /// 重新执行失败的请求
    Retry,
    /// 显示文件内容
    Show,
    /// 下载 mcqs.csv / mcqs.json，可指定目录
    Save(Option<PathBuf>),
    Status,
    Reset,
    Help,
    Quit,
}

impl Command {
    /// 解析一行输入，空行返回 `Ok(None)`
    pub fn parse(line: &str) -> AppResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "file" | "upload" => Command::File(PathBuf::from(require_arg(verb, arg)?)),
            "count" | "number" => {
                let raw = require_arg(verb, arg)?;
                let count = raw
                    .parse::<u8>()
                    .map_err(|_| invalid(format!("题目数量必须是 1 到 10 的整数: {}", raw)))?;
                Command::Count(count)
            }
            "subject" => {
                let raw = require_arg(verb, arg)?;
                Command::Subject(
                    Subject::find(raw).ok_or_else(|| invalid(format!("未知科目: {}", raw)))?,
                )
            }
            "tone" => {
                let raw = require_arg(verb, arg)?;
                Command::Tone(Tone::find(raw).ok_or_else(|| invalid(format!("未知难度: {}", raw)))?)
            }
            "generate" | "gen" => Command::Generate,
            "retry" => Command::Retry,
            "show" => Command::Show,
            "save" | "download" => {
                Command::Save((!arg.is_empty()).then(|| PathBuf::from(arg)))
            }
            "status" => Command::Status,
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(invalid(format!("未知命令: {}，输入 help 查看帮助", other))),
        };

        Ok(Some(command))
    }
}

fn require_arg<'a>(verb: &str, arg: &'a str) -> AppResult<&'a str> {
    if arg.is_empty() {
        Err(invalid(format!("命令 {} 需要一个参数", verb)))
    } else {
        Ok(arg)
    }
}

fn invalid(reason: String) -> AppError {
    AppError::unsupported("command", reason)
}
