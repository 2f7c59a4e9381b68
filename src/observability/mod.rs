//! 可观测性

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化 tracing：默认 info，可通过 RUST_LOG 覆盖；重复调用安全（测试内可能多次进入）
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .try_init();
}
