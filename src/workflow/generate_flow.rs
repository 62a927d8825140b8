//! 生成流程 - 流程层
//!
//! 流程顺序：
//! 1. 取出会话中待处理的请求
//! 2. 建立 LLM 客户端（缺少 API Key 在这里失败）
//! 3. 出题 → 点评
//! 4. 把结果或错误写回会话

use tracing::{error, info};

use crate::clients::ChatBackend;
use crate::error::{AppError, AppResult};
use crate::services::GenerationService;
use crate::utils::logging::truncate_text;
use crate::workflow::session_ctx::SessionCtx;

/// 生成流程
///
/// - 不持有任何资源，客户端每次执行时由调用方提供的工厂创建
/// - 只依赖业务能力（services）
pub struct GenerateFlow {
    strict_schema: bool,
}

impl GenerateFlow {
    pub fn new(strict_schema: bool) -> Self {
        Self { strict_schema }
    }

    /// 执行会话中待处理的请求
    ///
    /// 成功时结果写入会话；失败时错误同样写入会话并返回给调用方，
    /// 待处理标记保持不变
    pub async fn run<B, F>(&self, ctx: &mut SessionCtx, connect: F) -> AppResult<()>
    where
        B: ChatBackend,
        F: FnOnce() -> AppResult<B>,
    {
        let request = match ctx.resume() {
            Some(request) => request.clone(),
            None => {
                return Err(AppError::unsupported("session", "没有待处理的生成请求"));
            }
        };

        info!("{} 开始生成", ctx);
        info!("原文预览: {}", truncate_text(&request.text, 80));

        let outcome = match connect() {
            Ok(backend) => {
                GenerationService::new(backend, self.strict_schema)
                    .generate(&request)
                    .await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(output) => {
                info!("{} ✓ 生成成功", ctx);
                ctx.complete(output);
                Ok(())
            }
            Err(e) => {
                error!("{} ❌ 生成失败 [{}]: {}", ctx, e.kind(), e);
                ctx.fail(&e);
                Err(e)
            }
        }
    }
}
