//! 会话上下文
//!
//! 封装"当前表单填了什么、生成到哪一步"这一信息，
//! 在整个请求处理路径中显式传递。

use std::fmt::Display;

use chrono::{DateTime, Local};

use crate::error::{AppError, AppResult};
use crate::models::{Subject, Tone};
use crate::services::{GenerationOutput, GenerationRequest, MAX_QUESTIONS, MIN_QUESTIONS};

/// 表单默认题目数量
pub const DEFAULT_MCQ_COUNT: u8 = 3;

/// 会话所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 什么都没填
    Idle,
    /// 已经开始填写表单
    AwaitingInput,
    /// 已提交生成请求
    Generating,
    /// 生成成功，展示结果
    ShowingResult,
    /// 生成失败，展示错误
    ShowingError,
}

/// 展示给用户的错误信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
    pub detail: Option<String>,
}

impl From<&AppError> for ErrorReport {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            detail: err.detail(),
        }
    }
}

/// 会话上下文
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 会话创建时间
    pub created_at: DateTime<Local>,
    /// 上传的文件名
    pub file_name: Option<String>,
    /// 提取出的文本
    pub text: Option<String>,
    pub mcq_count: u8,
    pub subject: Subject,
    pub tone: Tone,
    /// 已提交但尚未成功完成的请求；失败后保留，用于重试
    pending_request: Option<GenerationRequest>,
    phase: Phase,
    result: Option<GenerationOutput>,
    last_error: Option<ErrorReport>,
}

impl Default for SessionCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCtx {
    /// 创建新的会话上下文
    pub fn new() -> Self {
        Self {
            created_at: Local::now(),
            file_name: None,
            text: None,
            mcq_count: DEFAULT_MCQ_COUNT,
            subject: Subject::default(),
            tone: Tone::default(),
            pending_request: None,
            phase: Phase::Idle,
            result: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 是否有待处理的生成请求
    pub fn is_pending(&self) -> bool {
        self.pending_request.is_some()
    }

    pub fn result(&self) -> Option<&GenerationOutput> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&ErrorReport> {
        self.last_error.as_ref()
    }

    /// 记录上传的文件内容
    pub fn set_file(&mut self, file_name: impl Into<String>, text: String) {
        self.file_name = Some(file_name.into());
        self.text = Some(text);
        self.touch();
    }

    /// 设置题目数量，范围 [1, 10]
    pub fn set_mcq_count(&mut self, count: u8) -> AppResult<()> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
            return Err(AppError::unsupported(
                "count",
                format!("题目数量必须在 {} 到 {} 之间", MIN_QUESTIONS, MAX_QUESTIONS),
            ));
        }
        self.mcq_count = count;
        self.touch();
        Ok(())
    }

    pub fn set_subject(&mut self, subject: Subject) {
        self.subject = subject;
        self.touch();
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
        self.touch();
    }

    /// 按当前表单提交生成请求
    ///
    /// 必须先上传文件；参数在此刻固定下来，之后修改表单不影响本次请求
    pub fn submit(&mut self) -> AppResult<&GenerationRequest> {
        let text = self
            .text
            .clone()
            .ok_or_else(|| AppError::unsupported("file", "请先上传 PDF 或 TXT 文件"))?;

        let request = GenerationRequest::new(text, self.mcq_count, self.subject, self.tone);
        self.result = None;
        self.last_error = None;
        self.phase = Phase::Generating;
        Ok(&*self.pending_request.insert(request))
    }

    /// 重新进入生成阶段（失败后重试），返回待处理的请求
    pub fn resume(&mut self) -> Option<&GenerationRequest> {
        let request = self.pending_request.as_ref()?;
        self.phase = Phase::Generating;
        Some(request)
    }

    /// 当前待处理请求
    pub fn pending_request(&self) -> Option<&GenerationRequest> {
        self.pending_request.as_ref()
    }

    /// 生成成功：清除待处理标记，保存结果
    pub fn complete(&mut self, output: GenerationOutput) {
        self.pending_request = None;
        self.last_error = None;
        self.result = Some(output);
        self.phase = Phase::ShowingResult;
    }

    /// 生成失败：保留待处理标记，记录错误
    pub fn fail(&mut self, err: &AppError) {
        self.last_error = Some(ErrorReport::from(err));
        self.phase = Phase::ShowingError;
    }

    /// 清空会话，回到初始状态
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 是否处于初始的空表单状态
    pub fn is_initial(&self) -> bool {
        self.phase == Phase::Idle
            && self.file_name.is_none()
            && self.text.is_none()
            && self.mcq_count == DEFAULT_MCQ_COUNT
            && self.subject == Subject::default()
            && self.tone == Tone::default()
            && self.pending_request.is_none()
            && self.result.is_none()
            && self.last_error.is_none()
    }

    /// 表单有变动时离开 Idle；正在展示的结果不受影响
    fn touch(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::AwaitingInput;
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文件#{} 题数#{} 科目#{} 难度#{}]",
            self.file_name.as_deref().unwrap_or("-"),
            self.mcq_count,
            self.subject,
            self.tone
        )
    }
}
