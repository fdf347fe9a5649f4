//! 多智能体层：Worker 契约、小节解析、委派注册表、Coordinator

pub mod coordinator;
pub mod registry;
pub mod sections;
pub mod worker;

pub use coordinator::{
    assemble_report, deficiency_notice, optimization_input, Coordinator, Delegated,
    DEFICIENCY_PREFIX,
};
pub use registry::{tool_schema_json, DelegationRegistry};
pub use sections::{SectionSet, NONE_IDENTIFIED};
pub use worker::{LlmWorker, Worker, WorkerRole, ANALYSIS_TOOL, OPTIMIZATION_TOOL};
