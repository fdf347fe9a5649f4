//! Mock LLM 客户端（离线演示与测试，无需 API）
//!
//! 根据 system 指令识别 Worker 角色，按固定格式生成四个小节；输出只依赖输入，结果确定。

use async_trait::async_trait;

use crate::agents::WorkerRole;
use crate::llm::{LlmClient, Message, Role};

/// Mock 客户端：分析 / 优化 Worker 返回规则生成的小节，其它情况回显最后一条 user 消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

impl MockLlmClient {
    fn analyse(input: &str) -> String {
        let steps: Vec<&str> = input
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let numbered = steps
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n");
        let manual = steps
            .iter()
            .filter(|s| s.to_lowercase().contains("manual"))
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Process Steps:\n{}\n\nBottlenecks:\n{}\n\nTools Involved:\nNone identified\n\nMissing Information:\n- Volumes and timings for each step\n- Owner of each step",
            or_none(&numbered),
            or_none(&manual),
        )
    }

    fn optimise(analysis: &str) -> String {
        let manual_steps = analysis
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("- ") && l.to_lowercase().contains("manual"))
            .map(|l| format!("- Automate: {}", &l[2..]))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Automation Opportunities:\n{}\n\nElimination of Redundant Steps:\nNone identified\n\nClearer Ownership:\n- Assign a single owner per step\n\nFeasibility Constraints:\nNone identified",
            or_none(&manual_steps),
        )
    }
}

fn or_none(s: &str) -> &str {
    if s.is_empty() {
        "None identified"
    } else {
        s
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .unwrap_or("");
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        if system == WorkerRole::Analysis.instructions() {
            Ok(Self::analyse(last_user))
        } else if system == WorkerRole::Optimization.instructions() {
            Ok(Self::optimise(last_user))
        } else {
            Ok(format!("Echo from Mock: {last_user}"))
        }
    }
}
