//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按入队顺序弹出预置回复，耗尽后回显最后一条 User 消息；embed 为确定性伪向量，
//! 便于在无网络环境下跑通整个编排循环与索引。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, Message, Role};

/// Mock 客户端：预置回复队列 + 确定性嵌入
#[derive(Debug, Default)]
pub struct MockLlm {
    responses: Mutex<VecDeque<String>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置按顺序返回的回复
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        if let Some(next) = self.responses.lock().ok().and_then(|mut q| q.pop_front()) {
            return Ok(next);
        }
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        Ok(format!("Echo: {}", last_user))
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, String> {
        Ok(inputs.iter().map(|text| embed_one(text)).collect())
    }
}

/// 确定性伪向量：按字节折叠到 8 维并归一化，相同文本必得相同向量
fn embed_one(text: &str) -> Vec<f32> {
    let mut v = [0f32; 8];
    for (i, b) in text.bytes().enumerate() {
        v[i % 8] += b as f32;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        vec![0.0; 8]
    } else {
        v.iter().map(|x| x / norm).collect()
    }
}
