//! 报告落盘：Markdown + JSON
//!
//! 文件名带时间戳后缀（process_report_YYYYMMDD-HHMMSS.{md,json}），输出目录不存在时自动创建。

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::AdvisorError;
use crate::report::Report;

/// JSON 文件的结构
#[derive(Debug, Serialize)]
struct ReportJson<'a> {
    timestamp: String,
    process_description: &'a str,
    custom_commands: &'a str,
    full_report: &'a str,
}

/// 写入后的文件路径
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

pub fn render_markdown(report: &Report) -> String {
    let mut md = String::from("# Business Process Automation Report\n\n");
    md.push_str(&format!(
        "**Date:** {}\n\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str("## Original Process Description\n");
    md.push_str(&format!("```\n{}\n```\n\n", report.process_description));
    if let Some(instructions) = &report.custom_instructions {
        md.push_str(&format!("**Additional Instructions:** {instructions}\n\n"));
    }
    md.push_str("## Full Report\n\n");
    md.push_str(&report.full_text);
    md
}

pub fn render_json(report: &Report) -> Result<String, AdvisorError> {
    let doc = ReportJson {
        timestamp: report.timestamp.to_rfc3339(),
        process_description: &report.process_description,
        custom_commands: report.custom_instructions.as_deref().unwrap_or("none"),
        full_report: &report.full_text,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// 写入两个文件
pub fn save_report(report: &Report, out_dir: &Path) -> Result<SavedReport, AdvisorError> {
    std::fs::create_dir_all(out_dir)?;
    let ts = report.timestamp.format("%Y%m%d-%H%M%S");

    let markdown = out_dir.join(format!("process_report_{ts}.md"));
    std::fs::write(&markdown, render_markdown(report))?;

    let json = out_dir.join(format!("process_report_{ts}.json"));
    std::fs::write(&json, render_json(report)?)?;

    tracing::info!("Report saved: {} / {}", markdown.display(), json.display());
    Ok(SavedReport { markdown, json })
}
