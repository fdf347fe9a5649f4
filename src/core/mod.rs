//! 核心层：错误类型、用户请求、运行执行器、资源生命周期

pub mod error;
pub mod lifecycle;
pub mod request;
pub mod run_executor;

pub use error::{AdvisorError, DelegationError, PlatformError};
pub use lifecycle::{CleanupReport, CleanupWarning, ResourceTracker};
pub use request::ProcessRequest;
pub use run_executor::RunExecutor;
