//! 托管平台数据类型：AgentDefinition、ToolBinding、Thread、Message、Run
//!
//! 全部为显式类型记录，按 id 传递；生命周期限定在单次运行内。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::PlatformError;

pub type AgentId = String;
pub type ThreadId = String;
pub type MessageId = String;
pub type RunId = String;

/// 委派工具绑定：把一个 Worker 的 AgentDefinition 暴露为可按名调用的能力
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolBinding {
    /// 被绑定的 AgentDefinition id
    pub id: AgentId,
    /// Coordinator 选择委派目标时使用的名字
    pub name: String,
    pub description: String,
}

impl ToolBinding {
    /// 以 Worker 定义的名字作为工具名
    pub fn for_agent(agent: &AgentDefinition, description: impl Into<String>) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            description: description.into(),
        }
    }
}

/// 平台上已创建的 Agent 定义（创建后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: AgentId,
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<ToolBinding>,
}

/// 创建 AgentDefinition 的请求，由 `AgentDefinitionBuilder` 构建
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefinitionRequest {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<ToolBinding>,
}

impl AgentDefinitionRequest {
    pub fn builder(name: impl Into<String>) -> AgentDefinitionBuilder {
        AgentDefinitionBuilder::new(name)
    }
}

/// AgentDefinitionRequest 构建器
pub struct AgentDefinitionBuilder {
    name: String,
    instructions: String,
    model: String,
    tools: Vec<ToolBinding>,
}

impl AgentDefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: String::new(),
            model: String::new(),
            tools: Vec::new(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// 追加工具绑定（保持顺序）
    pub fn tool(mut self, binding: ToolBinding) -> Self {
        self.tools.push(binding);
        self
    }

    pub fn tools(mut self, bindings: impl IntoIterator<Item = ToolBinding>) -> Self {
        self.tools.extend(bindings);
        self
    }

    pub fn build(self) -> AgentDefinitionRequest {
        AgentDefinitionRequest {
            name: self.name,
            instructions: self.instructions,
            model: self.model,
            tools: self.tools,
        }
    }
}

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// 线程中的一条消息，可包含多个文本段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: MessageId,
    pub role: MessageRole,
    pub segments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ThreadMessage {
    /// 最后一个文本段（最终回复）
    pub fn final_text(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

/// 单次运行的消息日志（只追加）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub messages: Vec<ThreadMessage>,
}

/// list_messages 的排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// 运行状态：Created → Queued → InProgress → {Completed, Failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Created,
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    /// 只允许沿状态机单调前进；任意非终态都可以进入 Failed
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, next),
            (Created, Queued)
                | (Queued, InProgress)
                | (InProgress, Completed)
                | (Created | Queued | InProgress, Failed)
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Created => "created",
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// 一次 Orchestrator 执行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub thread_id: ThreadId,
    pub agent_id: AgentId,
    pub status: RunStatus,
    pub last_error: Option<String>,
}

impl Run {
    pub fn new(id: RunId, thread_id: ThreadId, agent_id: AgentId) -> Self {
        Self {
            id,
            thread_id,
            agent_id,
            status: RunStatus::Created,
            last_error: None,
        }
    }

    /// 状态迁移；终态之后任何迁移都会被拒绝
    pub fn transition(&mut self, next: RunStatus) -> Result<(), PlatformError> {
        if !self.status.can_transition_to(next) {
            return Err(PlatformError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// 进入 Failed 并记录 last_error
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), PlatformError> {
        self.transition(RunStatus::Failed)?;
        self.last_error = Some(reason.into());
        Ok(())
    }
}
