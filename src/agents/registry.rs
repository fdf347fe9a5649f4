//! 委派工具注册表
//!
//! 每个 Worker 以一个 ToolBinding 注册，Coordinator 按绑定名调用；注册表每次运行重新构建，只追加、保持注册顺序。
//! 配置了超时时 delegate 对每次调用施加超时（默认不限时），并输出结构化审计日志（JSON）。

use std::sync::Arc;
use std::time::{Duration, Instant};

use schemars::{schema_for, JsonSchema};
use tokio::time::timeout;

use crate::agents::Worker;
use crate::core::DelegationError;
use crate::platform::ToolBinding;

/// 委派调用的参数格式（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct DelegationArgs {
    /// 交给 Worker 的完整输入文本
    pub input: String,
}

/// 返回一组绑定的 JSON Schema 描述，可拼入 Orchestrator 指令
pub fn tool_schema_json(bindings: &[ToolBinding]) -> String {
    let parameters = serde_json::to_value(schema_for!(DelegationArgs)).unwrap_or_default();
    let tools: Vec<serde_json::Value> = bindings
        .iter()
        .map(|b| {
            serde_json::json!({
                "name": b.name,
                "description": b.description,
                "parameters": parameters,
            })
        })
        .collect();
    serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
}

struct Delegate {
    binding: ToolBinding,
    worker: Arc<dyn Worker>,
}

/// 委派注册表：按注册顺序存储 (ToolBinding, Worker)
pub struct DelegationRegistry {
    delegates: Vec<Delegate>,
    timeout: Option<Duration>,
}

impl DelegationRegistry {
    /// timeout_secs 为 None 时委派调用不限时
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self {
            delegates: Vec::new(),
            timeout: timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            delegates: Vec::new(),
            timeout: Some(timeout),
        }
    }

    /// 追加一个委派目标；同名绑定已存在时拒绝
    pub fn register(
        &mut self,
        binding: ToolBinding,
        worker: Arc<dyn Worker>,
    ) -> Result<(), DelegationError> {
        if self.get(&binding.name).is_some() {
            return Err(DelegationError::DuplicateBinding(binding.name));
        }
        self.delegates.push(Delegate { binding, worker });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolBinding> {
        self.delegates
            .iter()
            .find(|d| d.binding.name == name)
            .map(|d| &d.binding)
    }

    pub fn bindings(&self) -> Vec<ToolBinding> {
        self.delegates.iter().map(|d| d.binding.clone()).collect()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.delegates.iter().map(|d| d.binding.name.clone()).collect()
    }

    pub fn to_schema_json(&self) -> String {
        tool_schema_json(&self.bindings())
    }

    /// 调用指定委派目标；超时返回 Timeout，Worker 返回 Err 转为 Failed，空白输出转为 EmptyOutput
    pub async fn delegate(&self, name: &str, input: &str) -> Result<String, DelegationError> {
        let delegate = self
            .delegates
            .iter()
            .find(|d| d.binding.name == name)
            .ok_or_else(|| DelegationError::UnknownDelegate(name.to_string()))?;

        let start = Instant::now();
        let result = match self.timeout {
            Some(limit) => timeout(limit, delegate.worker.invoke(input)).await,
            None => Ok(delegate.worker.invoke(input).await),
        };

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(text)) if text.trim().is_empty() => (false, "empty"),
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(_)) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        let audit = serde_json::json!({
            "event": "delegation_audit",
            "tool": name,
            "agent": delegate.binding.id,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "input_preview": input_preview(input),
        });
        tracing::info!(target: "delegation_audit", audit = %audit, "delegation");

        match result {
            Ok(Ok(text)) if text.trim().is_empty() => {
                Err(DelegationError::EmptyOutput(name.to_string()))
            }
            Ok(Ok(text)) => Ok(text),
            Ok(Err(reason)) => Err(DelegationError::Failed {
                name: name.to_string(),
                reason,
            }),
            Err(_) => Err(DelegationError::Timeout(name.to_string())),
        }
    }
}

fn input_preview(input: &str) -> String {
    if input.chars().count() > 200 {
        format!("{}...", input.chars().take(200).collect::<String>())
    } else {
        input.to_string()
    }
}
