//! 托管平台：数据类型、AgentPlatform 抽象、进程内实现 LocalPlatform

pub mod client;
pub mod local;
pub mod types;

pub use client::AgentPlatform;
pub use local::LocalPlatform;
pub use types::{
    AgentDefinition, AgentDefinitionBuilder, AgentDefinitionRequest, AgentId, MessageId,
    MessageRole, Run, RunId, RunStatus, SortOrder, Thread, ThreadId, ThreadMessage, ToolBinding,
};
