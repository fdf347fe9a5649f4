//! 报告结构校验
//!
//! 检查两个大标题与八个小节标题是否齐全（小节必须出现在所属大标题之后、下一个大标题之前）。
//! 缺失只作为数据质量告警返回，不是错误：Coordinator 本应已为无法填充的小节输出缺失提示。

use crate::agents::sections::is_title_line;
use crate::agents::{SectionSet, WorkerRole, DEFICIENCY_PREFIX};

/// 校验结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub missing_sections: Vec<String>,
    pub missing_subsections: Vec<String>,
    /// 正文以缺失提示开头的小节数
    pub deficiencies: usize,
}

impl ValidationReport {
    pub fn is_complete(&self) -> bool {
        self.missing_sections.is_empty() && self.missing_subsections.is_empty()
    }

    /// 面向用户的告警文本
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .missing_sections
            .iter()
            .map(|s| format!("Missing section: {s}"))
            .collect();
        warnings.extend(
            self.missing_subsections
                .iter()
                .map(|s| format!("Missing subsection: {s}")),
        );
        if self.deficiencies > 0 {
            warnings.push(format!(
                "{} subsection(s) carry a deficiency notice; consider re-running",
                self.deficiencies
            ));
        }
        warnings
    }
}

pub fn validate_report(full_text: &str) -> ValidationReport {
    let lines: Vec<&str> = full_text.lines().collect();
    let title_index = |role: WorkerRole| {
        lines
            .iter()
            .position(|l| is_title_line(l, role.section_title()))
    };

    let mut report = ValidationReport::default();
    let starts: Vec<Option<usize>> = WorkerRole::ALL.iter().map(|r| title_index(*r)).collect();

    for (i, role) in WorkerRole::ALL.iter().enumerate() {
        let Some(start) = starts[i] else {
            report.missing_sections.push(role.section_title().to_string());
            report
                .missing_subsections
                .extend(role.headings().iter().map(|h| h.to_string()));
            continue;
        };
        let end = starts
            .iter()
            .flatten()
            .copied()
            .filter(|&s| s > start)
            .min()
            .unwrap_or(lines.len());
        let sections = SectionSet::parse(&lines[start + 1..end].join("\n"), role.headings());
        for heading in role.headings() {
            match sections.body(heading) {
                Some(body) if body.starts_with(DEFICIENCY_PREFIX) => report.deficiencies += 1,
                Some(_) => {}
                None => report.missing_subsections.push(heading.to_string()),
            }
        }
    }

    report
}
