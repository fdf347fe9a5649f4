//! Worker Agent：结构化小节生成者
//!
//! 两个变体共用一个抽象：把自由文本映射为固定顺序、固定名字的四个小节。
//! WorkerRole 描述每个变体的契约（工具名、大标题、小节标题、指令），
//! Worker trait 是一次委派调用的执行方式；LlmWorker 用平台上的 AgentDefinition + LlmClient 实现它。

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{LlmClient, Message};
use crate::platform::AgentDefinition;

pub const ANALYSIS_TOOL: &str = "process_analysis_agent";
pub const OPTIMIZATION_TOOL: &str = "process_optimization_advisor";

const ANALYSIS_HEADINGS: [&str; 4] = [
    "Process Steps",
    "Bottlenecks",
    "Tools Involved",
    "Missing Information",
];

const OPTIMIZATION_HEADINGS: [&str; 4] = [
    "Automation Opportunities",
    "Elimination of Redundant Steps",
    "Clearer Ownership",
    "Feasibility Constraints",
];

const ANALYSIS_INSTRUCTIONS: &str = "You are a Business Process Analysis expert. \
Analyse the provided process description and extract the following four items:\n\
1. Current process steps: list them in order as a numbered list.\n\
2. Bottlenecks or inefficiencies: what slows down or disrupts the process.\n\
3. Tools, systems, or resources currently involved: software, equipment, manual methods.\n\
4. Missing information: what additional details are needed to fully understand the process.\n\n\
Present your findings in exactly four sections with the following headings: \
'Process Steps', 'Bottlenecks', 'Tools Involved', 'Missing Information'. \
If any category has no items, explicitly state 'None identified' under that heading. \
Do not add any extra commentary outside these sections.";

const OPTIMIZATION_INSTRUCTIONS: &str = "You are a Process Optimization Advisor. \
Based on the analysis provided, recommend improvements covering exactly four categories:\n\
1. Automation opportunities: which steps could be automated and with what technology.\n\
2. Elimination of redundant steps: steps that add no value and could be removed.\n\
3. Clearer ownership: who should be responsible for each step or area.\n\
4. Feasibility constraints: technical, organisational, or cost limitations to consider.\n\n\
Present your recommendations in exactly four sections with the following headings: \
'Automation Opportunities', 'Elimination of Redundant Steps', 'Clearer Ownership', \
'Feasibility Constraints'. \
If any category has no items, explicitly state 'None identified' under that heading. \
Do not add any extra commentary outside these sections.";

/// Worker 变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerRole {
    Analysis,
    Optimization,
}

impl WorkerRole {
    /// 报告中的顺序
    pub const ALL: [WorkerRole; 2] = [WorkerRole::Analysis, WorkerRole::Optimization];

    /// AgentDefinition 名，同时也是 ToolBinding 名
    pub fn tool_name(self) -> &'static str {
        match self {
            WorkerRole::Analysis => ANALYSIS_TOOL,
            WorkerRole::Optimization => OPTIMIZATION_TOOL,
        }
    }

    /// 报告中的大标题
    pub fn section_title(self) -> &'static str {
        match self {
            WorkerRole::Analysis => "PROCESS ANALYSIS",
            WorkerRole::Optimization => "OPTIMIZATION RECOMMENDATIONS",
        }
    }

    pub fn headings(self) -> &'static [&'static str; 4] {
        match self {
            WorkerRole::Analysis => &ANALYSIS_HEADINGS,
            WorkerRole::Optimization => &OPTIMIZATION_HEADINGS,
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            WorkerRole::Analysis => ANALYSIS_INSTRUCTIONS,
            WorkerRole::Optimization => OPTIMIZATION_INSTRUCTIONS,
        }
    }

    pub fn tool_description(self) -> &'static str {
        match self {
            WorkerRole::Analysis => {
                "Analyses a business process and extracts steps, bottlenecks, tools, missing info."
            }
            WorkerRole::Optimization => {
                "Provides automation recommendations based on process analysis."
            }
        }
    }
}

/// 一次委派调用：输入文本 → Worker 的原始输出
#[async_trait]
pub trait Worker: Send + Sync {
    async fn invoke(&self, input: &str) -> Result<String, String>;
}

/// 由 AgentDefinition 指令驱动的 LLM Worker
pub struct LlmWorker {
    definition: AgentDefinition,
    llm: Arc<dyn LlmClient>,
}

impl LlmWorker {
    pub fn new(definition: AgentDefinition, llm: Arc<dyn LlmClient>) -> Self {
        Self { definition, llm }
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }
}

#[async_trait]
impl Worker for LlmWorker {
    async fn invoke(&self, input: &str) -> Result<String, String> {
        let messages = [
            Message::system(self.definition.instructions.clone()),
            Message::user(input),
        ];
        self.llm.complete(&messages).await
    }
}
