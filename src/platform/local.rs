//! 进程内托管平台
//!
//! 在本进程内保存 AgentDefinition / Thread，并用 LlmClient 执行运行：
//! - 带工具绑定的定义（Orchestrator）：按绑定构建 DelegationRegistry，交给 Coordinator 顺序委派；
//! - 无工具的定义：以其指令为 system 消息，对整个线程做一次补全。
//! 运行结果作为一条 assistant 消息追加到线程，然后 Run 才进入 Completed。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::agents::{Coordinator, DelegationRegistry, LlmWorker};
use crate::core::{PlatformError, ProcessRequest, RunExecutor};
use crate::llm::{LlmClient, Message};
use crate::platform::{
    AgentDefinition, AgentDefinitionRequest, AgentId, AgentPlatform, MessageRole, Run, SortOrder,
    Thread, ThreadId, ThreadMessage,
};

pub struct LocalPlatform {
    llm: Arc<dyn LlmClient>,
    delegation_timeout_secs: Option<u64>,
    agents: RwLock<HashMap<AgentId, AgentDefinition>>,
    threads: RwLock<HashMap<ThreadId, Thread>>,
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

impl LocalPlatform {
    /// delegation_timeout_secs 为 None 时委派调用不限时
    pub fn new(llm: Arc<dyn LlmClient>, delegation_timeout_secs: Option<u64>) -> Self {
        Self {
            llm,
            delegation_timeout_secs,
            agents: RwLock::new(HashMap::new()),
            threads: RwLock::new(HashMap::new()),
        }
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    /// 当前仍存在的 AgentDefinition 数量
    pub async fn agent_count(&self) -> usize {
        self.agents.read().await.len()
    }

    async fn append_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, PlatformError> {
        let mut threads = self.threads.write().await;
        let thread = threads.get_mut(thread_id).ok_or_else(|| PlatformError::NotFound {
            kind: "thread",
            id: thread_id.clone(),
        })?;
        let message = ThreadMessage {
            id: new_id("msg"),
            role,
            segments: vec![content.to_string()],
            created_at: Utc::now(),
        };
        thread.messages.push(message.clone());
        Ok(message)
    }

    /// 按 Orchestrator 的工具绑定构建 Coordinator；绑定目标必须仍然存在
    async fn build_coordinator(&self, agent: &AgentDefinition) -> Result<Coordinator, String> {
        let agents = self.agents.read().await;
        let mut registry = DelegationRegistry::new(self.delegation_timeout_secs);
        for binding in &agent.tools {
            let definition = agents.get(&binding.id).cloned().ok_or_else(|| {
                format!("tool '{}' targets missing agent {}", binding.name, binding.id)
            })?;
            registry
                .register(
                    binding.clone(),
                    Arc::new(LlmWorker::new(definition, self.llm.clone())),
                )
                .map_err(|e| e.to_string())?;
        }
        Ok(Coordinator::new(registry))
    }

    /// 一次运行的实际工作
    async fn execute(&self, agent: &AgentDefinition, thread_id: &ThreadId) -> Result<(), String> {
        let messages = self
            .threads
            .read()
            .await
            .get(thread_id)
            .map(|t| t.messages.clone())
            .unwrap_or_default();

        let output = if agent.tools.is_empty() {
            let mut chat = vec![Message::system(agent.instructions.clone())];
            for m in &messages {
                let text = m.segments.join("\n");
                chat.push(match m.role {
                    MessageRole::User => Message::user(text),
                    MessageRole::Assistant => Message::assistant(text),
                });
            }
            self.llm.complete(&chat).await?
        } else {
            let request = messages
                .iter()
                .rev()
                .filter(|m| m.role == MessageRole::User)
                .find_map(|m| m.final_text())
                .map(ProcessRequest::from_user_message)
                .ok_or_else(|| "thread has no user message".to_string())?;
            let coordinator = self.build_coordinator(agent).await?;
            tracing::info!(
                agent = %agent.id,
                tools = ?coordinator.registry().tool_names(),
                "Coordinating delegated workers"
            );
            coordinator.coordinate(&request).await
        };

        self.append_message(thread_id, MessageRole::Assistant, &output)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[async_trait]
impl AgentPlatform for LocalPlatform {
    async fn create_agent_definition(
        &self,
        request: AgentDefinitionRequest,
    ) -> Result<AgentDefinition, PlatformError> {
        let mut agents = self.agents.write().await;
        if let Some(binding) = request.tools.iter().find(|b| !agents.contains_key(&b.id)) {
            return Err(PlatformError::UnknownToolTarget {
                name: binding.name.clone(),
                id: binding.id.clone(),
            });
        }

        let definition = AgentDefinition {
            id: new_id("asst"),
            name: request.name,
            instructions: request.instructions,
            model: request.model,
            tools: request.tools,
        };
        agents.insert(definition.id.clone(), definition.clone());
        tracing::info!(agent = %definition.id, "Created agent '{}'", definition.name);
        Ok(definition)
    }

    async fn create_thread(&self) -> Result<Thread, PlatformError> {
        let thread = Thread {
            id: new_id("thread"),
            messages: Vec::new(),
        };
        self.threads
            .write()
            .await
            .insert(thread.id.clone(), thread.clone());
        Ok(thread)
    }

    async fn post_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, PlatformError> {
        self.append_message(thread_id, role, content).await
    }

    async fn start_run(
        &self,
        thread_id: &ThreadId,
        agent_id: &AgentId,
    ) -> Result<Run, PlatformError> {
        let agent = self
            .agents
            .read()
            .await
            .get(agent_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound {
                kind: "agent",
                id: agent_id.clone(),
            })?;
        if !self.threads.read().await.contains_key(thread_id) {
            return Err(PlatformError::NotFound {
                kind: "thread",
                id: thread_id.clone(),
            });
        }

        let run = Run::new(new_id("run"), thread_id.clone(), agent_id.clone());
        tracing::info!(run = %run.id, agent = %agent.name, "Starting run");
        Ok(RunExecutor::new(run)
            .execute(self.execute(&agent, thread_id))
            .await)
    }

    async fn list_messages(
        &self,
        thread_id: &ThreadId,
        order: SortOrder,
    ) -> Result<Vec<ThreadMessage>, PlatformError> {
        let mut messages = self
            .threads
            .read()
            .await
            .get(thread_id)
            .map(|t| t.messages.clone())
            .ok_or_else(|| PlatformError::NotFound {
                kind: "thread",
                id: thread_id.clone(),
            })?;
        if order == SortOrder::Descending {
            messages.reverse();
        }
        Ok(messages)
    }

    async fn delete_agent_definition(&self, agent_id: &AgentId) -> Result<(), PlatformError> {
        self.agents
            .write()
            .await
            .remove(agent_id)
            .map(|_| ())
            .ok_or_else(|| PlatformError::NotFound {
                kind: "agent",
                id: agent_id.clone(),
            })
    }
}
