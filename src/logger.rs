//! tracing 日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化日志，默认 info 级别，可通过 RUST_LOG 覆盖
///
/// 日志写到 stderr，stdout 留给表单输出
pub fn init() {
    init_with_verbose(false);
}

/// `verbose` 为 true 时默认级别提升到 debug
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
