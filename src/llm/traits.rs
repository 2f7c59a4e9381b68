//! LLM 客户端抽象
//!
//! complete 返回完整回复文本；embed 返回与输入一一对应的向量。实现方自带有界重试
//! （固定退避、次数上限），重试耗尽后返回错误，由编排器视为该次运行的致命失败。

use async_trait::async_trait;

use crate::llm::Message;

/// LLM 客户端 trait：对话补全与向量化
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式对话补全
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 批量文本向量化
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, String>;
}
