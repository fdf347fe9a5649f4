//! LLM 客户端抽象
//!
//! 托管平台用它执行 Agent：Worker 的一次委派 = 一次非流式 complete（system 指令 + user 输入）。

use async_trait::async_trait;

use crate::llm::Message;

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
