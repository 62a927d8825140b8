//! LLM API 客户端
//!
//! 封装所有与 LLM API 相关的调用逻辑
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（通过 `OPENAI_API_BASE` 指定端点）

use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::TokenUsage;

/// 单次对话的回复
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub content: String,
    pub usage: TokenUsage,
}

/// 对话能力
///
/// 生成流程只依赖这个接口，测试中可以换成脚本化的实现
pub trait ChatBackend {
    /// 发送一轮对话，返回文本内容和用量
    fn chat(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> impl Future<Output = AppResult<ChatReply>> + Send;

    /// 模型名称，用于日志和错误信息
    fn model_name(&self) -> &str;
}

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    ///
    /// 缺少 API Key 时返回配置错误，此时不会发出任何请求
    pub fn new(config: &Config) -> AppResult<Self> {
        let api_key = config.require_api_key()?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.temperature,
        })
    }

    fn build_messages(
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        Ok(messages)
    }
}

impl ChatBackend for LlmClient {
    async fn chat(&self, user_message: &str, system_message: Option<&str>) -> AppResult<ChatReply> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let messages = Self::build_messages(user_message, system_message)
            .map_err(|e| AppError::remote_call(&self.model_name, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| AppError::remote_call(&self.model_name, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::remote_call(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let usage = response
            .usage
            .as_ref()
            .map(|u| {
                TokenUsage::for_call(
                    &self.model_name,
                    u64::from(u.prompt_tokens),
                    u64::from(u.completion_tokens),
                )
            })
            .unwrap_or_default();

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::RemoteCall {
                model: self.model_name.clone(),
                message: "LLM 返回内容为空".to_string(),
                detail: None,
            })?;

        Ok(ChatReply {
            content,
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let config = Config::default();
        match LlmClient::new(&config) {
            Err(err) => assert_eq!(err.kind(), "ConfigError"),
            Ok(_) => panic!("缺少 API Key 时不应创建客户端"),
        }
    }

    #[test]
    fn test_new_uses_configured_model() {
        let config = Config {
            llm_api_key: Some("sk-test".to_string()),
            llm_model_name: "gpt-4o-mini".to_string(),
            ..Config::default()
        };
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_build_messages_with_system() {
        let messages = LlmClient::build_messages("hi", Some("be brief")).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }

    /// 测试真实 API 调用
    ///
    /// 运行方式：
    /// ```bash
    /// OPENAI_API_KEY=... cargo test test_chat_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_chat_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = LlmClient::new(&Config::from_env().unwrap()).expect("需要 OPENAI_API_KEY");
        let reply = client
            .chat("Reply with the single word: pong", Some("You are terse."))
            .await
            .expect("LLM 调用失败");

        println!("LLM 响应: {}", reply.content);
        println!("用量: {:?}", reply.usage);
        assert!(!reply.content.is_empty());
    }
}
