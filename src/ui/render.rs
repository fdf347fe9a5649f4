//! 控制台渲染：报告正文清理、告警、落盘路径与清理摘要

use std::sync::OnceLock;

use regex::Regex;

use crate::advisor::AdvisorOutcome;
use crate::core::CleanupReport;
use crate::report::SavedReport;

struct MarkdownPatterns {
    citation: Regex,
    bullet: Regex,
    bold: Regex,
    italic: Regex,
}

fn patterns() -> Option<&'static MarkdownPatterns> {
    static PATTERNS: OnceLock<Option<MarkdownPatterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let build = || -> Result<MarkdownPatterns, regex::Error> {
                Ok(MarkdownPatterns {
                    citation: Regex::new(r"【[^】]*】")?,
                    bullet: Regex::new(r"(?m)^[ \t]*[-*•][ \t]+")?,
                    bold: Regex::new(r"\*\*([^*]+)\*\*")?,
                    italic: Regex::new(r"\*([^*\n]+)\*")?,
                })
            };
            build()
                .map_err(|e| tracing::warn!("Markdown patterns unavailable: {}", e))
                .ok()
        })
        .as_ref()
}

/// 去掉引用标记、行首列表符号与加粗 / 斜体标记，仅用于控制台显示
pub fn clean_markdown(text: &str) -> String {
    let Some(p) = patterns() else {
        return text.trim().to_string();
    };
    let text = p.citation.replace_all(text, "");
    let text = p.bullet.replace_all(&text, "");
    let text = p.bold.replace_all(&text, "$1");
    let text = p.italic.replace_all(&text, "$1");
    text.trim().to_string()
}

/// 把运行结果渲染为控制台文本
pub fn render_outcome(outcome: &AdvisorOutcome) -> String {
    match outcome {
        AdvisorOutcome::Skipped => "No process description provided. Nothing to analyse.".to_string(),
        AdvisorOutcome::RunFailed { run_id, last_error } => {
            format!("Run {run_id} failed: {last_error}")
        }
        AdvisorOutcome::Completed { report, validation } => {
            let mut out = String::from("=== PROCESS REPORT ===\n\n");
            out.push_str(&clean_markdown(&report.full_text));
            let warnings = validation.warnings();
            if !warnings.is_empty() {
                out.push_str("\n\nWarnings:");
                for w in warnings {
                    out.push_str(&format!("\n  ! {w}"));
                }
            }
            out
        }
    }
}

pub fn render_saved(saved: &SavedReport) -> String {
    format!(
        "Report saved to:\n  {}\n  {}",
        saved.markdown.display(),
        saved.json.display()
    )
}

pub fn render_cleanup(cleanup: &CleanupReport) -> String {
    let mut out = format!(
        "Cleanup: {} of {} agent definition(s) deleted",
        cleanup.deleted.len(),
        cleanup.attempted()
    );
    for w in &cleanup.warnings {
        out.push_str(&format!("\n  ! {} ({}): {}", w.name, w.agent_id, w.reason));
    }
    out
}
