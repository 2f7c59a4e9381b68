//! LLM 客户端抽象与实现
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient：complete（对话补全）与 embed（文本向量化）。

pub mod mock;
pub mod openai;
pub mod traits;

use serde::{Deserialize, Serialize};

pub use mock::MockLlm;
pub use openai::OpenAiClient;
pub use traits::LlmClient;

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 单条消息：对话历史与 Prompt 的基本单元
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
