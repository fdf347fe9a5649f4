//! 流程顾问流水线
//!
//! acquire：创建分析 / 优化两个 Worker 定义，再创建引用它们的 Orchestrator 定义；
//! use：建线程、写入用户消息、阻塞运行到终态、收集并校验报告；
//! release：无论 use 阶段如何结束（完成、运行失败、平台错误），都删除全部已创建定义。

use std::sync::Arc;

use chrono::Local;

use crate::agents::{tool_schema_json, WorkerRole};
use crate::core::{AdvisorError, CleanupReport, ProcessRequest, ResourceTracker};
use crate::platform::{
    AgentDefinitionRequest, AgentPlatform, MessageRole, RunId, RunStatus, SortOrder, ToolBinding,
};
use crate::report::{collect_full_text, validate_report, Report, ValidationReport};

pub const ORCHESTRATOR_NAME: &str = "process_orchestrator";

const ORCHESTRATOR_INSTRUCTIONS: &str = "You are a Process Automation Orchestrator. \
The user has already provided a process description. Your job is to:\n\
1. Call 'process_analysis_agent' to analyse the process. It returns four sections: \
'Process Steps', 'Bottlenecks', 'Tools Involved', 'Missing Information'.\n\
2. Give that full analysis to 'process_optimization_advisor' to generate recommendations. \
It returns four sections: 'Automation Opportunities', 'Elimination of Redundant Steps', \
'Clearer Ownership', 'Feasibility Constraints'.\n\
3. Present the final output with two main sections: 'PROCESS ANALYSIS' and \
'OPTIMIZATION RECOMMENDATIONS', each containing its four sub-sections exactly as provided. \
Do not add commentary or merge sections. If any of the eight sub-sections is missing, \
explicitly note the deficiency and ask the user to rerun.";

/// Orchestrator 指令：固定说明 + 委派工具 Schema
pub fn orchestrator_instructions(bindings: &[ToolBinding]) -> String {
    format!(
        "{ORCHESTRATOR_INSTRUCTIONS}\n\n## Delegation tools\n```json\n{}\n```",
        tool_schema_json(bindings)
    )
}

/// 一次调用的结果
#[derive(Debug, Clone)]
pub enum AdvisorOutcome {
    /// 描述为空，未创建任何资源
    Skipped,
    /// 运行完成；validation 中的缺失只是数据质量告警
    Completed {
        report: Report,
        validation: ValidationReport,
    },
    /// 运行进入 Failed（不重试）
    RunFailed { run_id: RunId, last_error: String },
}

#[derive(Debug, Clone)]
pub struct AdvisorResult {
    pub outcome: AdvisorOutcome,
    pub cleanup: CleanupReport,
}

/// 流水线入口；平台会话与模型名显式传入
pub struct ProcessAdvisor {
    platform: Arc<dyn AgentPlatform>,
    model: String,
}

impl ProcessAdvisor {
    pub fn new(platform: Arc<dyn AgentPlatform>, model: impl Into<String>) -> Self {
        Self {
            platform,
            model: model.into(),
        }
    }

    pub async fn run(&self, request: &ProcessRequest) -> Result<AdvisorResult, AdvisorError> {
        if request.is_blank() {
            tracing::info!("No process description provided, nothing to do");
            return Ok(AdvisorResult {
                outcome: AdvisorOutcome::Skipped,
                cleanup: CleanupReport::default(),
            });
        }

        let mut resources = ResourceTracker::new(self.platform.clone());
        let outcome = self.orchestrate(request, &mut resources).await;
        let cleanup = resources.release_all().await;

        if let Err(e) = &outcome {
            tracing::error!("Pipeline aborted after cleanup: {}", e);
        }
        Ok(AdvisorResult {
            outcome: outcome?,
            cleanup,
        })
    }

    async fn orchestrate(
        &self,
        request: &ProcessRequest,
        resources: &mut ResourceTracker,
    ) -> Result<AdvisorOutcome, AdvisorError> {
        // Worker 必须先于 Orchestrator 创建
        let mut bindings = Vec::with_capacity(WorkerRole::ALL.len());
        for role in WorkerRole::ALL {
            let worker = self
                .platform
                .create_agent_definition(
                    AgentDefinitionRequest::builder(role.tool_name())
                        .model(self.model.as_str())
                        .instructions(role.instructions())
                        .build(),
                )
                .await?;
            resources.track(&worker);
            bindings.push(ToolBinding::for_agent(&worker, role.tool_description()));
        }

        let orchestrator = self
            .platform
            .create_agent_definition(
                AgentDefinitionRequest::builder(ORCHESTRATOR_NAME)
                    .model(self.model.as_str())
                    .instructions(orchestrator_instructions(&bindings))
                    .tools(bindings)
                    .build(),
            )
            .await?;
        resources.track(&orchestrator);

        let thread = self.platform.create_thread().await?;
        self.platform
            .post_message(&thread.id, MessageRole::User, &request.to_user_message())
            .await?;

        let run = self.platform.start_run(&thread.id, &orchestrator.id).await?;
        match run.status {
            RunStatus::Completed => {}
            RunStatus::Failed => {
                let last_error = run
                    .last_error
                    .unwrap_or_else(|| "run failed without error details".to_string());
                tracing::warn!(run = %run.id, "Run failed: {}", last_error);
                return Ok(AdvisorOutcome::RunFailed {
                    run_id: run.id,
                    last_error,
                });
            }
            other => {
                return Ok(AdvisorOutcome::RunFailed {
                    run_id: run.id,
                    last_error: format!("run returned in non-terminal state {other}"),
                });
            }
        }

        let messages = self
            .platform
            .list_messages(&thread.id, SortOrder::Ascending)
            .await?;
        let full_text = collect_full_text(&messages);
        let validation = validate_report(&full_text);
        for warning in validation.warnings() {
            tracing::warn!("Report quality: {}", warning);
        }

        Ok(AdvisorOutcome::Completed {
            report: Report {
                process_description: request.description().to_string(),
                custom_instructions: request.custom_instructions().map(str::to_string),
                full_text,
                timestamp: Local::now(),
            },
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::agents::{assemble_report, Delegated};
    use crate::core::PlatformError;
    use crate::platform::{AgentDefinition, AgentId, Run, Thread, ThreadId, ThreadMessage};

    /// 可编排失败点的平台：记录创建 / 删除与调用顺序
    #[derive(Default)]
    struct ScriptedPlatform {
        fail_run: bool,
        fail_list: bool,
        fail_orchestrator: bool,
        fail_delete: bool,
        requests: Mutex<Vec<AgentDefinitionRequest>>,
        created: Mutex<Vec<AgentId>>,
        deleted: Mutex<Vec<AgentId>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedPlatform {
        fn call(&self, name: &'static str) {
            self.calls.lock().unwrap().push(name);
        }
    }

    #[async_trait]
    impl AgentPlatform for ScriptedPlatform {
        async fn create_agent_definition(
            &self,
            request: AgentDefinitionRequest,
        ) -> Result<AgentDefinition, PlatformError> {
            self.call("create_agent_definition");
            if self.fail_orchestrator && !request.tools.is_empty() {
                return Err(PlatformError::Llm("quota exceeded".into()));
            }
            let id = format!("asst_{}", self.created.lock().unwrap().len());
            self.created.lock().unwrap().push(id.clone());
            self.requests.lock().unwrap().push(request.clone());
            Ok(AgentDefinition {
                id,
                name: request.name,
                instructions: request.instructions,
                model: request.model,
                tools: request.tools,
            })
        }

        async fn create_thread(&self) -> Result<Thread, PlatformError> {
            self.call("create_thread");
            Ok(Thread { id: "thread_0".into(), messages: vec![] })
        }

        async fn post_message(
            &self,
            _thread_id: &ThreadId,
            role: MessageRole,
            content: &str,
        ) -> Result<ThreadMessage, PlatformError> {
            self.call("post_message");
            Ok(ThreadMessage {
                id: "msg_0".into(),
                role,
                segments: vec![content.to_string()],
                created_at: Utc::now(),
            })
        }

        async fn start_run(
            &self,
            thread_id: &ThreadId,
            agent_id: &AgentId,
        ) -> Result<Run, PlatformError> {
            self.call("start_run");
            let mut run = Run::new("run_0".into(), thread_id.clone(), agent_id.clone());
            if self.fail_run {
                run.fail("rate limited").unwrap();
            } else {
                for s in [RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed] {
                    run.transition(s).unwrap();
                }
            }
            Ok(run)
        }

        async fn list_messages(
            &self,
            _thread_id: &ThreadId,
            _order: SortOrder,
        ) -> Result<Vec<ThreadMessage>, PlatformError> {
            self.call("list_messages");
            if self.fail_list {
                return Err(PlatformError::NotFound { kind: "thread", id: "thread_0".into() });
            }
            let text = assemble_report(
                &Delegated::Delivered("Process Steps:\n1. A".into()),
                &Delegated::Unavailable("offline".into()),
            );
            Ok(vec![ThreadMessage {
                id: "msg_1".into(),
                role: MessageRole::Assistant,
                segments: vec![text],
                created_at: Utc::now(),
            }])
        }

        async fn delete_agent_definition(&self, agent_id: &AgentId) -> Result<(), PlatformError> {
            self.deleted.lock().unwrap().push(agent_id.clone());
            if self.fail_delete {
                return Err(PlatformError::Llm("delete refused".into()));
            }
            Ok(())
        }
    }

    fn advisor(platform: &Arc<ScriptedPlatform>) -> ProcessAdvisor {
        ProcessAdvisor::new(platform.clone(), "test-model")
    }

    fn request() -> ProcessRequest {
        ProcessRequest::new("Customer submits ticket", None)
    }

    fn sorted(mut ids: Vec<AgentId>) -> Vec<AgentId> {
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_blank_description_creates_nothing() {
        let platform = Arc::new(ScriptedPlatform::default());
        let result = advisor(&platform)
            .run(&ProcessRequest::new("   \n", Some("focus".into())))
            .await
            .unwrap();
        assert!(matches!(result.outcome, AdvisorOutcome::Skipped));
        assert!(platform.calls.lock().unwrap().is_empty());
        assert_eq!(result.cleanup.attempted(), 0);
    }

    #[tokio::test]
    async fn test_workers_created_before_orchestrator() {
        let platform = Arc::new(ScriptedPlatform::default());
        advisor(&platform).run(&request()).await.unwrap();

        let requests = platform.requests.lock().unwrap();
        let names: Vec<_> = requests.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, [WorkerRole::Analysis.tool_name(), WorkerRole::Optimization.tool_name(), ORCHESTRATOR_NAME]);
        let tools = &requests[2].tools;
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].id, "asst_0");
        assert_eq!(tools[0].name, WorkerRole::Analysis.tool_name());
        assert_eq!(tools[1].id, "asst_1");
        assert!(requests[2].instructions.contains("\"process_optimization_advisor\""));
        assert!(requests.iter().all(|r| r.model == "test-model"));
    }

    #[tokio::test]
    async fn test_completed_run_cleans_up_everything() {
        let platform = Arc::new(ScriptedPlatform::default());
        let result = advisor(&platform).run(&request()).await.unwrap();

        match result.outcome {
            AdvisorOutcome::Completed { report, validation } => {
                assert!(report.full_text.starts_with("PROCESS ANALYSIS"));
                assert_eq!(report.process_description, "Customer submits ticket");
                assert!(validation.is_complete());
                assert_eq!(validation.deficiencies, 7);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(
            sorted(platform.deleted.lock().unwrap().clone()),
            sorted(platform.created.lock().unwrap().clone())
        );
        assert_eq!(result.cleanup.deleted.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_run_is_reported_and_cleaned_up() {
        let platform = Arc::new(ScriptedPlatform { fail_run: true, ..Default::default() });
        let result = advisor(&platform).run(&request()).await.unwrap();

        match result.outcome {
            AdvisorOutcome::RunFailed { last_error, .. } => assert_eq!(last_error, "rate limited"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!platform.calls.lock().unwrap().contains(&"list_messages"));
        assert_eq!(platform.deleted.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_error_during_collection_still_cleans_up() {
        let platform = Arc::new(ScriptedPlatform { fail_list: true, ..Default::default() });
        let err = advisor(&platform).run(&request()).await.unwrap_err();

        assert!(matches!(err, AdvisorError::Platform(PlatformError::NotFound { .. })));
        assert_eq!(
            sorted(platform.deleted.lock().unwrap().clone()),
            ["asst_0", "asst_1", "asst_2"]
        );
    }

    #[tokio::test]
    async fn test_orchestrator_creation_failure_deletes_workers() {
        let platform = Arc::new(ScriptedPlatform { fail_orchestrator: true, ..Default::default() });
        assert!(advisor(&platform).run(&request()).await.is_err());
        assert_eq!(sorted(platform.deleted.lock().unwrap().clone()), ["asst_0", "asst_1"]);
    }

    #[tokio::test]
    async fn test_delete_failures_do_not_escalate() {
        let platform = Arc::new(ScriptedPlatform { fail_delete: true, ..Default::default() });
        let result = advisor(&platform).run(&request()).await.unwrap();

        assert!(matches!(result.outcome, AdvisorOutcome::Completed { .. }));
        assert_eq!(result.cleanup.warnings.len(), 3);
        assert_eq!(platform.deleted.lock().unwrap().len(), 3);
    }
}
