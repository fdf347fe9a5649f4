//! 错误类型
//!
//! - `AdvisorError`：流水线级错误。只有 ConfigError 属于「预检致命」，其余在创建资源之后出现时
//!   仍会先走完清理再返回。
//! - `PlatformError`：托管平台（创建/删除定义、线程、运行）返回的错误。
//! - `DelegationError`：单次委派调用失败，由 Coordinator 就地转为报告中的缺失提示，不向上传播。

use thiserror::Error;

/// 流水线错误（ProcessAdvisor::run 的 Err 分支）
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// 缺少连接 / 模型配置；在创建任何资源之前抛出
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 托管平台错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// ToolBinding 指向的 AgentDefinition 不存在（Worker 必须先于 Orchestrator 创建）
    #[error("Tool binding '{name}' targets unknown agent {id}")]
    UnknownToolTarget { name: String, id: String },

    #[error("Invalid run transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("LLM error: {0}")]
    Llm(String),
}

/// 委派调用失败（DelegationFailure）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegationError {
    #[error("Unknown delegate: {0}")]
    UnknownDelegate(String),

    #[error("Delegate already registered: {0}")]
    DuplicateBinding(String),

    #[error("Delegate '{name}' failed: {reason}")]
    Failed { name: String, reason: String },

    #[error("Delegate timeout: {0}")]
    Timeout(String),

    #[error("Delegate '{0}' returned no text")]
    EmptyOutput(String),
}
