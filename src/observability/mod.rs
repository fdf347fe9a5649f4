//! 可观测性：tracing 订阅器
//!
//! 日志写 stderr，避免与控制台报告输出混在一起；级别默认 info，可通过 RUST_LOG 覆盖。
//! 委派审计日志 target 为 `delegation_audit`，可单独过滤（如 `RUST_LOG=delegation_audit=info`）。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
