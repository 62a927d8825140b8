//! # MCQ Generator
//!
//! 从 PDF / TXT 文件中提取文本，交给 LLM 生成选择题，并以表格展示、支持下载
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 持有 LLM API 客户端，只暴露对话能力
//! - `ChatBackend` - 对话能力接口，`LlmClient` 为基于 async-openai 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `GenerationService` - 出题 + 点评两步提示链
//! - `ExportService` - 写 mcqs.csv / mcqs.json
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次生成"的完整处理流程
//! - `SessionCtx` - 会话上下文（表单内容 + 阶段 + 结果）
//! - `GenerateFlow` - 流程编排（建客户端 → 出题 → 点评 → 写回会话）
//!
//! ### ④ 交互层（App / UI）
//! - `app` - 逐行读取表单命令并调度
//! - `ui/` - 命令解析与结果渲染
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{ChatBackend, ChatReply, LlmClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{McqRow, Quiz, Subject, TokenUsage, Tone};
pub use services::{GenerationOutput, GenerationRequest, GenerationService};
pub use workflow::{GenerateFlow, Phase, SessionCtx};
