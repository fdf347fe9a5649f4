//! 小节解析与渲染
//!
//! 识别 Worker 输出中的小节标题（允许 `#`、`**`、编号前缀，以及冒号后直接跟内容），
//! 小节正文原样保留；第一个标题之前的文本丢弃。重复标题只取第一次出现，
//! 之后再出现的同名标题行按正文保留在当前小节中；列表条目（"* X:"、"- X:"）不视为标题。

pub const NONE_IDENTIFIED: &str = "None identified";

/// 去掉行首的 Markdown 装饰与编号（"### ", "**", "1. ", "2) "）
fn strip_decoration(line: &str) -> &str {
    let s = line
        .trim()
        .trim_start_matches(|c: char| matches!(c, '#' | '*' | '_') || c.is_whitespace());
    let digits = s.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = s[digits..]
            .strip_prefix('.')
            .or_else(|| s[digits..].strip_prefix(')'))
        {
            return rest
                .trim_start_matches(|c: char| matches!(c, '*' | '_') || c.is_whitespace());
        }
    }
    s
}

/// 行首为列表符号后跟空白（"* "、"- "、"+ "、"• "）
fn is_list_item(line: &str) -> bool {
    let mut chars = line.trim_start().chars();
    matches!(chars.next(), Some('*' | '-' | '+' | '•'))
        && chars.next().is_some_and(char::is_whitespace)
}

/// 若该行是 headings 中某个标题，返回 (标题, 冒号后的行内内容)
pub(crate) fn match_heading<'h>(line: &str, headings: &[&'h str]) -> Option<(&'h str, String)> {
    if is_list_item(line) {
        return None;
    }
    let s = strip_decoration(line);
    for &heading in headings {
        let Some(prefix) = s.get(..heading.len()) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case(heading) {
            continue;
        }
        let rest = s[heading.len()..].trim_start_matches(['*', '_']).trim_start();
        if rest.is_empty() {
            return Some((heading, String::new()));
        }
        if let Some(inline) = rest.strip_prefix(':') {
            let inline = inline.trim_start_matches(['*', '_']).trim();
            return Some((heading, inline.to_string()));
        }
    }
    None
}

/// 是否为独立的大标题行（如 "PROCESS ANALYSIS"、"## PROCESS ANALYSIS"）
pub(crate) fn is_title_line(line: &str, title: &str) -> bool {
    strip_decoration(line)
        .trim_end_matches(['*', '_', ':'])
        .trim()
        .eq_ignore_ascii_case(title)
}

/// 解析出的小节集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSet {
    found: Vec<(&'static str, String)>,
}

impl SectionSet {
    /// 按 headings 解析文本
    pub fn parse(text: &str, headings: &[&'static str]) -> Self {
        let mut found: Vec<(&'static str, Vec<String>)> = Vec::new();
        let mut current: Option<usize> = None;
        let mut preamble = 0usize;

        for line in text.lines() {
            if let Some((heading, inline)) = match_heading(line, headings) {
                if found.iter().any(|(h, _)| *h == heading) {
                    tracing::debug!("Repeated heading '{}' kept as body text", heading);
                    if let Some(i) = current {
                        found[i].1.push(line.to_string());
                    }
                    continue;
                }
                let body = if inline.is_empty() { vec![] } else { vec![inline] };
                found.push((heading, body));
                current = Some(found.len() - 1);
                continue;
            }
            match current {
                Some(i) => found[i].1.push(line.to_string()),
                None if !line.trim().is_empty() => preamble += 1,
                None => {}
            }
        }

        if preamble > 0 {
            tracing::debug!("Dropped {} lines outside declared sections", preamble);
        }

        Self {
            found: found
                .into_iter()
                .map(|(h, lines)| (h, lines.join("\n").trim().to_string()))
                .collect(),
        }
    }

    /// 小节正文；标题存在但正文为空时返回 "None identified"
    pub fn body(&self, heading: &str) -> Option<&str> {
        self.found
            .iter()
            .find(|(h, _)| *h == heading)
            .map(|(_, body)| if body.is_empty() { NONE_IDENTIFIED } else { body.as_str() })
    }

    pub fn missing(&self, headings: &[&'static str]) -> Vec<&'static str> {
        headings
            .iter()
            .copied()
            .filter(|h| self.body(h).is_none())
            .collect()
    }
}
