//! Process Advisor - 业务流程分析与优化多智能体编排
//!
//! 模块划分：
//! - **advisor**: 端到端流水线（创建定义、运行、收集报告、保证清理）
//! - **agents**: Worker 角色、委派注册表、Coordinator 与小节解析
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、请求、运行状态推进、资源清理
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **observability**: tracing 初始化
//! - **platform**: 托管平台抽象（定义、线程、消息、运行）与进程内实现
//! - **report**: 报告收集、结构校验、Markdown / JSON 落盘
//! - **ui**: 控制台输入与输出渲染

pub mod advisor;
pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod platform;
pub mod report;
pub mod ui;

pub use advisor::{AdvisorOutcome, AdvisorResult, ProcessAdvisor};
