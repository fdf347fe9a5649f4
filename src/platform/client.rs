//! 托管平台抽象
//!
//! 流水线只通过 AgentPlatform 与平台交互；会话由调用方显式持有（`Arc<dyn AgentPlatform>`）并逐层传递，
//! 不存在全局客户端。

use async_trait::async_trait;

use crate::core::PlatformError;
use crate::platform::{
    AgentDefinition, AgentDefinitionRequest, AgentId, MessageRole, Run, SortOrder, Thread,
    ThreadId, ThreadMessage,
};

#[async_trait]
pub trait AgentPlatform: Send + Sync {
    /// 创建 Agent 定义；tools 中每个绑定的目标必须已存在
    async fn create_agent_definition(
        &self,
        request: AgentDefinitionRequest,
    ) -> Result<AgentDefinition, PlatformError>;

    async fn create_thread(&self) -> Result<Thread, PlatformError>;

    async fn post_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, PlatformError>;

    /// 启动运行并阻塞直到终态（Completed / Failed）
    async fn start_run(&self, thread_id: &ThreadId, agent_id: &AgentId)
        -> Result<Run, PlatformError>;

    async fn list_messages(
        &self,
        thread_id: &ThreadId,
        order: SortOrder,
    ) -> Result<Vec<ThreadMessage>, PlatformError>;

    async fn delete_agent_definition(&self, agent_id: &AgentId) -> Result<(), PlatformError>;
}
