pub mod llm_client;

pub use llm_client::{ChatBackend, ChatReply, LlmClient};
