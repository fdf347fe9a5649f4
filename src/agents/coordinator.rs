//! Coordinator：顺序委派并组装两段式报告
//!
//! 1. 把流程描述交给分析 Worker；
//! 2. 分析结果可用后，才把完整分析输出（可附加用户指令）交给优化 Worker；
//! 3. 按固定顺序输出 PROCESS ANALYSIS / OPTIMIZATION RECOMMENDATIONS 及各自四个小节，正文原样保留。
//!
//! 任一委派失败或缺少小节标题都不会中断：缺失的小节以缺失提示（要求重新运行）代替，已有小节照常输出。

use crate::agents::{DelegationRegistry, SectionSet, WorkerRole};
use crate::core::ProcessRequest;

/// 一次委派的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delegated {
    /// Worker 返回的原始文本
    Delivered(String),
    /// 调用失败或未执行，附原因
    Unavailable(String),
}

/// 缺失提示的固定开头
pub const DEFICIENCY_PREFIX: &str = "DEFICIENCY:";

/// 缺失提示：替代无法填充的小节
pub fn deficiency_notice(role: WorkerRole, heading: &str, reason: &str) -> String {
    let reason = reason.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(
        "{DEFICIENCY_PREFIX} '{heading}' was not provided by {} ({reason}). Please re-run the analysis.",
        role.tool_name()
    )
}

/// 优化 Worker 的输入：完整分析输出，有附加指令时追加在后
pub fn optimization_input(analysis: &str, custom_instructions: Option<&str>) -> String {
    match custom_instructions {
        Some(instructions) => format!("{analysis}\n\nAdditional instructions: {instructions}"),
        None => analysis.to_string(),
    }
}

pub struct Coordinator {
    registry: DelegationRegistry,
}

impl Coordinator {
    pub fn new(registry: DelegationRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DelegationRegistry {
        &self.registry
    }

    /// 顺序执行两次委派并返回完整报告文本
    pub async fn coordinate(&self, request: &ProcessRequest) -> String {
        let analysis = self
            .delegate(WorkerRole::Analysis, request.description())
            .await;

        let optimization = match &analysis {
            Delegated::Delivered(text) => {
                let input = optimization_input(text, request.custom_instructions());
                self.delegate(WorkerRole::Optimization, &input).await
            }
            Delegated::Unavailable(reason) => {
                tracing::warn!("Skipping optimization, analysis unavailable: {}", reason);
                Delegated::Unavailable(format!("analysis unavailable: {reason}"))
            }
        };

        assemble_report(&analysis, &optimization)
    }

    async fn delegate(&self, role: WorkerRole, input: &str) -> Delegated {
        match self.registry.delegate(role.tool_name(), input).await {
            Ok(text) => Delegated::Delivered(text),
            Err(e) => {
                tracing::warn!("Delegation to {} failed: {}", role.tool_name(), e);
                Delegated::Unavailable(e.to_string())
            }
        }
    }
}

/// 按固定结构组装报告
pub fn assemble_report(analysis: &Delegated, optimization: &Delegated) -> String {
    let mut blocks = Vec::with_capacity(10);
    for (role, outcome) in [
        (WorkerRole::Analysis, analysis),
        (WorkerRole::Optimization, optimization),
    ] {
        blocks.push(role.section_title().to_string());
        let sections = match outcome {
            Delegated::Delivered(text) => Ok(SectionSet::parse(text, role.headings())),
            Delegated::Unavailable(reason) => Err(reason.as_str()),
        };
        for heading in role.headings() {
            let body = match &sections {
                Ok(s) => s.body(heading).map(str::to_string).unwrap_or_else(|| {
                    tracing::warn!("{} output is missing '{}'", role.tool_name(), heading);
                    deficiency_notice(role, heading, "heading missing from output")
                }),
                Err(reason) => deficiency_notice(role, heading, reason),
            };
            blocks.push(format!("{heading}:\n{body}"));
        }
    }
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::agents::{Worker, ANALYSIS_TOOL, NONE_IDENTIFIED, OPTIMIZATION_TOOL};
    use crate::platform::ToolBinding;

    const ANALYSIS_OUT: &str = "Process Steps:\n1. Email\n2. Spreadsheet\n\nBottlenecks: Manual logging causes delay\n\nTools Involved:\n- Email\n\nMissing Information:\nNone identified";
    const OPTIMIZATION_OUT: &str = "Automation Opportunities: Use ticketing system webhook\nElimination of Redundant Steps: Drop spreadsheet\nClearer Ownership: Support lead\nFeasibility Constraints:\nNone identified";

    /// 记录调用事件与输入的 Mock Worker
    struct Recording {
        label: &'static str,
        output: Result<String, String>,
        events: Arc<Mutex<Vec<String>>>,
        inputs: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Worker for Recording {
        async fn invoke(&self, input: &str) -> Result<String, String> {
            self.events.lock().unwrap().push(format!("{}:start", self.label));
            self.inputs.lock().unwrap().push(input.to_string());
            tokio::task::yield_now().await;
            self.events.lock().unwrap().push(format!("{}:end", self.label));
            self.output.clone()
        }
    }

    struct Harness {
        coordinator: Coordinator,
        events: Arc<Mutex<Vec<String>>>,
        analysis_inputs: Arc<Mutex<Vec<String>>>,
        optimization_inputs: Arc<Mutex<Vec<String>>>,
    }

    fn harness(analysis: Result<&str, &str>, optimization: Result<&str, &str>) -> Harness {
        let events = Arc::new(Mutex::new(Vec::new()));
        let analysis_inputs = Arc::new(Mutex::new(Vec::new()));
        let optimization_inputs = Arc::new(Mutex::new(Vec::new()));
        let mut registry = DelegationRegistry::new(Some(5));
        registry
            .register(
                ToolBinding { id: "asst_a".into(), name: ANALYSIS_TOOL.into(), description: String::new() },
                Arc::new(Recording {
                    label: "analysis",
                    output: analysis.map(String::from).map_err(String::from),
                    events: events.clone(),
                    inputs: analysis_inputs.clone(),
                }),
            )
            .unwrap();
        registry
            .register(
                ToolBinding { id: "asst_o".into(), name: OPTIMIZATION_TOOL.into(), description: String::new() },
                Arc::new(Recording {
                    label: "optimization",
                    output: optimization.map(String::from).map_err(String::from),
                    events: events.clone(),
                    inputs: optimization_inputs.clone(),
                }),
            )
            .unwrap();
        Harness {
            coordinator: Coordinator::new(registry),
            events,
            analysis_inputs,
            optimization_inputs,
        }
    }

    #[tokio::test]
    async fn test_optimizer_receives_full_analysis_output() {
        let h = harness(Ok(ANALYSIS_OUT), Ok(OPTIMIZATION_OUT));
        h.coordinator
            .coordinate(&ProcessRequest::new("Customer emails ticket", None))
            .await;

        assert_eq!(*h.analysis_inputs.lock().unwrap(), ["Customer emails ticket"]);
        assert_eq!(*h.optimization_inputs.lock().unwrap(), [ANALYSIS_OUT]);
    }

    #[tokio::test]
    async fn test_analysis_completes_before_optimization_starts() {
        let h = harness(Ok(ANALYSIS_OUT), Ok(OPTIMIZATION_OUT));
        h.coordinator.coordinate(&ProcessRequest::new("x", None)).await;
        assert_eq!(
            *h.events.lock().unwrap(),
            ["analysis:start", "analysis:end", "optimization:start", "optimization:end"]
        );
    }

    #[tokio::test]
    async fn test_custom_instructions_follow_analysis() {
        let h = harness(Ok(ANALYSIS_OUT), Ok(OPTIMIZATION_OUT));
        h.coordinator
            .coordinate(&ProcessRequest::new("x", Some("prefer open-source tools".into())))
            .await;
        let inputs = h.optimization_inputs.lock().unwrap();
        assert_eq!(
            inputs[0],
            format!("{ANALYSIS_OUT}\n\nAdditional instructions: prefer open-source tools")
        );
    }

    #[tokio::test]
    async fn test_report_structure_and_verbatim_bodies() {
        let h = harness(Ok(ANALYSIS_OUT), Ok(OPTIMIZATION_OUT));
        let report = h.coordinator.coordinate(&ProcessRequest::new("x", None)).await;

        let expected = "PROCESS ANALYSIS\n\n\
            Process Steps:\n1. Email\n2. Spreadsheet\n\n\
            Bottlenecks:\nManual logging causes delay\n\n\
            Tools Involved:\n- Email\n\n\
            Missing Information:\nNone identified\n\n\
            OPTIMIZATION RECOMMENDATIONS\n\n\
            Automation Opportunities:\nUse ticketing system webhook\n\n\
            Elimination of Redundant Steps:\nDrop spreadsheet\n\n\
            Clearer Ownership:\nSupport lead\n\n\
            Feasibility Constraints:\nNone identified";
        assert_eq!(report, expected);
    }

    #[tokio::test]
    async fn test_missing_heading_gets_deficiency_notice() {
        let partial = "Process Steps:\n1. Email\nTools Involved: Email";
        let h = harness(Ok(partial), Ok(OPTIMIZATION_OUT));
        let report = h.coordinator.coordinate(&ProcessRequest::new("x", None)).await;

        assert!(report.contains("Process Steps:\n1. Email"));
        assert!(report.contains("Tools Involved:\nEmail"));
        assert!(report.contains(&format!(
            "Bottlenecks:\n{}",
            deficiency_notice(WorkerRole::Analysis, "Bottlenecks", "heading missing from output")
        )));
        assert!(report.contains("Missing Information:\nDEFICIENCY:"));
        // 部分分析仍然可用，优化照常执行
        assert_eq!(h.optimization_inputs.lock().unwrap().len(), 1);
        assert!(report.contains("Automation Opportunities:\nUse ticketing system webhook"));
    }

    #[tokio::test]
    async fn test_failed_analysis_skips_optimization() {
        let h = harness(Err("model overloaded"), Ok(OPTIMIZATION_OUT));
        let report = h.coordinator.coordinate(&ProcessRequest::new("x", None)).await;

        assert!(h.optimization_inputs.lock().unwrap().is_empty());
        assert_eq!(report.matches("DEFICIENCY:").count(), 8);
        assert!(report.contains("model overloaded"));
        assert!(report.contains("analysis unavailable"));
        assert!(report.starts_with("PROCESS ANALYSIS\n\nProcess Steps:\n"));
        assert!(report.contains("\n\nOPTIMIZATION RECOMMENDATIONS\n\n"));
    }

    #[tokio::test]
    async fn test_failed_optimization_keeps_analysis() {
        let h = harness(Ok(ANALYSIS_OUT), Err("timeout upstream"));
        let report = h.coordinator.coordinate(&ProcessRequest::new("x", None)).await;

        assert!(report.contains("Bottlenecks:\nManual logging causes delay"));
        assert_eq!(report.matches("DEFICIENCY:").count(), 4);
        assert!(report.contains(OPTIMIZATION_TOOL));
    }

    #[tokio::test]
    async fn test_missing_delegate_degrades_to_notices() {
        let coordinator = Coordinator::new(DelegationRegistry::new(Some(5)));
        let report = coordinator.coordinate(&ProcessRequest::new("x", None)).await;
        assert_eq!(report.matches("DEFICIENCY:").count(), 8);
        assert!(report.contains("Unknown delegate: process_analysis_agent"));
    }

    #[test]
    fn test_empty_sections_use_placeholder() {
        let analysis = Delegated::Delivered(
            "Process Steps:\nBottlenecks:\nTools Involved:\nMissing Information:".into(),
        );
        let report = assemble_report(&analysis, &Delegated::Unavailable("skipped".into()));
        assert_eq!(report.matches(NONE_IDENTIFIED).count(), 4);
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_reports() {
        let first = harness(Ok(ANALYSIS_OUT), Ok(OPTIMIZATION_OUT));
        let second = harness(Ok(ANALYSIS_OUT), Ok(OPTIMIZATION_OUT));
        let req = ProcessRequest::new("same", None);
        assert_eq!(
            first.coordinator.coordinate(&req).await,
            second.coordinator.coordinate(&req).await
        );
    }
}
