//! 出题服务 - 业务能力层
//!
//! 两步提示链：先按原文出题，再让模型点评题目难度。
//! 只负责"生成"能力，不关心表单和会话状态。

use serde_json::Value;
use tracing::{debug, info};

use crate::clients::ChatBackend;
use crate::error::{AppError, AppResult};
use crate::models::{response_json_example, strip_code_fence, Quiz, Subject, Tone, TokenUsage};

/// 题目数量上下限
pub const MIN_QUESTIONS: u8 = 1;
pub const MAX_QUESTIONS: u8 = 10;

/// 一次生成请求的全部参数
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub text: String,
    pub number: u8,
    pub subject: Subject,
    pub tone: Tone,
    /// 期望的返回结构示例（序列化后的 JSON）
    pub response_json: String,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, number: u8, subject: Subject, tone: Tone) -> Self {
        Self {
            text: text.into(),
            number,
            subject,
            tone,
            response_json: response_json_example().to_string(),
        }
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    /// 题目 JSON（已去掉代码块包裹），用于校验和表格
    pub quiz: String,
    /// 模型返回的原始题目字符串，逐字节写入 mcqs.json
    pub raw_quiz: String,
    /// 对题目的点评
    pub review: String,
    /// 两步调用的累计用量
    pub usage: TokenUsage,
}

/// 出题服务
pub struct GenerationService<B> {
    backend: B,
    strict_schema: bool,
}

impl<B: ChatBackend> GenerationService<B> {
    pub fn new(backend: B, strict_schema: bool) -> Self {
        Self {
            backend,
            strict_schema,
        }
    }

    /// 执行出题 + 点评
    ///
    /// 任一步失败立即返回，不重试，也不返回部分结果
    pub async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationOutput> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&request.number) {
            return Err(AppError::unsupported(
                "number",
                format!(
                    "题目数量 {} 超出范围 [{}, {}]",
                    request.number, MIN_QUESTIONS, MAX_QUESTIONS
                ),
            ));
        }

        info!(
            "🤖 正在生成 {} 道 {} 题目 (难度: {}, 模型: {})",
            request.number,
            request.subject,
            request.tone,
            self.backend.model_name()
        );

        let mut usage = TokenUsage::default();

        // 第一步：出题
        let quiz_reply = self
            .backend
            .chat(&build_quiz_prompt(request), Some(QUIZ_SYSTEM_MESSAGE))
            .await?;
        usage.add(&quiz_reply.usage);

        let quiz = strip_code_fence(&quiz_reply.content);
        self.validate_quiz(&quiz)?;
        debug!("题目 JSON 校验通过，长度 {} 字符", quiz.len());

        // 第二步：点评
        let review_reply = self
            .backend
            .chat(&build_review_prompt(request.subject, &quiz), None)
            .await?;
        usage.add(&review_reply.usage);

        info!("✓ 生成完成，共消耗 {} tokens", usage.total_tokens);

        Ok(GenerationOutput {
            quiz,
            raw_quiz: quiz_reply.content,
            review: review_reply.content.trim().to_string(),
            usage,
        })
    }

    /// 边界校验：严格模式检查完整结构，宽松模式只要求是合法 JSON
    fn validate_quiz(&self, quiz: &str) -> AppResult<()> {
        if self.strict_schema {
            let parsed = Quiz::parse(quiz)?;
            if parsed.is_empty() {
                return Err(AppError::response_parse("模型没有返回任何题目", None));
            }
        } else {
            serde_json::from_str::<Value>(quiz)?;
        }
        Ok(())
    }
}

const QUIZ_SYSTEM_MESSAGE: &str =
    "You are an expert MCQ maker. You always answer with a single JSON object and nothing else.";

/// 出题提示词
pub fn build_quiz_prompt(request: &GenerationRequest) -> String {
    format!(
        r#"Text:{text}
You are an expert MCQ maker. Given the above text, it is your job to create a quiz of {number} multiple choice questions for {subject} students in {tone} tone.
Make sure the questions are not repeated and check all the questions to be conforming the text as well.
Make sure to format your response like RESPONSE_JSON below and use it as a guide. Ensure to make {number} MCQs
### RESPONSE_JSON
{response_json}
"#,
        text = request.text,
        number = request.number,
        subject = request.subject,
        tone = request.tone,
        response_json = request.response_json,
    )
}

/// 点评提示词
pub fn build_review_prompt(subject: Subject, quiz: &str) -> String {
    format!(
        r#"You are an expert english grammarian and writer. Given a Multiple Choice Quiz for {subject} students.
You need to evaluate the complexity of the question and give a complete analysis of the quiz. Only use at max 50 words for complexity analysis.
If the quiz is not at par with the cognitive and analytical abilities of the students, update the quiz questions which need to be changed and change the tone such that it perfectly fits the student abilities
Quiz_MCQs:
{quiz}

Check from an expert English Writer of the above quiz:
"#
    )
}
