//! 用户请求：流程描述 + 可选附加指令
//!
//! 请求以固定格式写入线程的第一条 user 消息，托管侧（LocalPlatform）再解析回 ProcessRequest，
//! 因此 `to_user_message` 与 `from_user_message` 必须保持对称。
//! 指令行总是写出（未提供时为 "none"），且指令本身不含换行，
//! 所以最后一个指令标记一定是格式自带的那一个，描述中出现同样的文字也不会被截断。

use serde::{Deserialize, Serialize};

const DESCRIPTION_PREFIX: &str = "Process description:\n";
const INSTRUCTIONS_MARKER: &str = "\nAdditional instructions: ";
const CLOSING_LINE: &str = "\nPlease analyse and optimise this process.";

/// 一次分析请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    description: String,
    custom_instructions: Option<String>,
}

impl ProcessRequest {
    /// 附加指令为空或 "none"（不区分大小写）时视为未提供；多行指令合并为一行
    pub fn new(description: impl Into<String>, custom_instructions: Option<String>) -> Self {
        let custom_instructions = custom_instructions
            .map(|s| {
                s.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"));
        Self {
            description: description.into(),
            custom_instructions,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn custom_instructions(&self) -> Option<&str> {
        self.custom_instructions.as_deref()
    }

    /// 空白描述：流水线在创建任何资源之前直接返回
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
    }

    /// 写入线程的 user 消息
    pub fn to_user_message(&self) -> String {
        format!(
            "{DESCRIPTION_PREFIX}{}\n{INSTRUCTIONS_MARKER}{}\n{CLOSING_LINE}",
            self.description,
            self.custom_instructions.as_deref().unwrap_or("none")
        )
    }

    /// 解析 `to_user_message` 生成的文本；不符合格式时整段文本作为描述
    pub fn from_user_message(text: &str) -> Self {
        let Some(body) = text.strip_prefix(DESCRIPTION_PREFIX) else {
            return Self::new(text.trim(), None);
        };
        let body = body.strip_suffix(CLOSING_LINE).unwrap_or(body);
        let body = body.strip_suffix('\n').unwrap_or(body);
        match body.rsplit_once(INSTRUCTIONS_MARKER) {
            Some((description, instructions)) if !instructions.contains('\n') => Self::new(
                description.strip_suffix('\n').unwrap_or(description),
                Some(instructions.to_string()),
            ),
            _ => Self::new(body, None),
        }
    }
}
