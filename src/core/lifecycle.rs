//! 资源生命周期管理
//!
//! ResourceTracker 记录本次运行在平台上创建的每个 AgentDefinition，
//! release_all 逐个尝试删除：单个失败只记 warn，不影响其余删除，也从不向上抛错。
//! 每个被追踪的 id 只会尝试删除一次（release_all 会清空追踪列表）。

use std::sync::Arc;

use crate::platform::{AgentDefinition, AgentId, AgentPlatform};

/// 删除失败（CleanupWarning）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    pub agent_id: AgentId,
    pub name: String,
    pub reason: String,
}

/// 一次清理的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: Vec<AgentId>,
    pub warnings: Vec<CleanupWarning>,
}

impl CleanupReport {
    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.warnings.len()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

struct TrackedAgent {
    id: AgentId,
    name: String,
}

/// 运行期资源追踪器
pub struct ResourceTracker {
    platform: Arc<dyn AgentPlatform>,
    agents: Vec<TrackedAgent>,
}

impl ResourceTracker {
    pub fn new(platform: Arc<dyn AgentPlatform>) -> Self {
        Self {
            platform,
            agents: Vec::new(),
        }
    }

    /// 创建成功后立即登记，保证后续任何退出路径都能删除它
    pub fn track(&mut self, agent: &AgentDefinition) {
        self.agents.push(TrackedAgent {
            id: agent.id.clone(),
            name: agent.name.clone(),
        });
    }

    pub fn tracked(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }

    /// 逆创建顺序删除全部已登记定义（先 Orchestrator，后 Worker）
    pub async fn release_all(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();
        if self.agents.is_empty() {
            return report;
        }
        tracing::info!("Cleaning up {} agent definitions...", self.agents.len());

        while let Some(agent) = self.agents.pop() {
            match self.platform.delete_agent_definition(&agent.id).await {
                Ok(()) => {
                    tracing::info!(agent = %agent.id, "Deleted agent '{}'", agent.name);
                    report.deleted.push(agent.id);
                }
                Err(e) => {
                    tracing::warn!("Could not delete agent {} ({}): {}", agent.id, agent.name, e);
                    report.warnings.push(CleanupWarning {
                        agent_id: agent.id,
                        name: agent.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

impl Drop for ResourceTracker {
    fn drop(&mut self) {
        if !self.agents.is_empty() {
            tracing::error!(
                "ResourceTracker dropped with {} unreleased agent definitions: {:?}",
                self.agents.len(),
                self.tracked()
            );
        }
    }
}
