//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 使用默认级别（info）初始化日志
pub fn init() {
    init_with_verbose(false);
}

/// 初始化日志
///
/// `RUST_LOG` 优先；否则 `verbose` 为 true 时本 crate 使用 debug 级别。
pub fn init_with_verbose(verbose: bool) {
    let default_filter = if verbose {
        "info,photo_labeler=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
