pub mod generate_flow;
pub mod session_ctx;

pub use generate_flow::GenerateFlow;
pub use session_ctx::{ErrorReport, Phase, SessionCtx, DEFAULT_MCQ_COUNT};
