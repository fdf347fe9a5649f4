//! 输出收集：从线程消息中提取最终报告文本
//!
//! 消息按创建顺序升序读取，只保留 assistant 消息，取每条的最后一个文本段，按顺序用换行拼接。

use crate::platform::{MessageRole, ThreadMessage};

/// 收集 assistant 文本段（保持顺序）
pub fn assistant_texts(messages: &[ThreadMessage]) -> Vec<&str> {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .filter_map(ThreadMessage::final_text)
        .collect()
}

/// 拼接出 full_text
pub fn collect_full_text(messages: &[ThreadMessage]) -> String {
    assistant_texts(messages).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(role: MessageRole, segments: &[&str]) -> ThreadMessage {
        ThreadMessage {
            id: "msg".into(),
            role,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_assistant_final_segments_in_order() {
        let messages = vec![
            message(MessageRole::User, &["Process description: ..."]),
            message(MessageRole::Assistant, &["draft", "PROCESS ANALYSIS"]),
            message(MessageRole::User, &["follow-up"]),
            message(MessageRole::Assistant, &["OPTIMIZATION RECOMMENDATIONS"]),
        ];
        assert_eq!(
            collect_full_text(&messages),
            "PROCESS ANALYSIS\nOPTIMIZATION RECOMMENDATIONS"
        );
    }

    #[test]
    fn test_assistant_without_text_is_skipped() {
        let messages = vec![
            message(MessageRole::Assistant, &[]),
            message(MessageRole::Assistant, &["only"]),
        ];
        assert_eq!(assistant_texts(&messages), ["only"]);
        assert_eq!(collect_full_text(&[]), "");
    }
}
