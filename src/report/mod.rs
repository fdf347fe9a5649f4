//! 报告：收集、结构校验、落盘

pub mod collector;
pub mod validator;
pub mod writer;

use chrono::{DateTime, Local};
use serde::Serialize;

pub use collector::{assistant_texts, collect_full_text};
pub use validator::{validate_report, ValidationReport};
pub use writer::{render_json, render_markdown, save_report, SavedReport};

/// 一次运行产出的报告（由线程中的 assistant 消息派生）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub process_description: String,
    pub custom_instructions: Option<String>,
    pub full_text: String,
    pub timestamp: DateTime<Local>,
}
