//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；chat 与 embeddings
//! 均带固定退避重试（次数与间隔来自配置），重试耗尽后才把最后一次错误向上报出。

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::types::embeddings::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;

use crate::config::LlmSection;
use crate::llm::{LlmClient, Message, Role};

/// OpenAI 兼容客户端：持有 Client、模型名与重试策略
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    embedding_model: String,
    max_tokens: u32,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl OpenAiClient {
    /// 从配置创建；API Key 优先取参数，其次 OPENAI_API_KEY
    pub fn new(cfg: &LlmSection, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = cfg.base_url.as_deref() {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: cfg.model.clone(),
            embedding_model: cfg.embedding_model.clone(),
            max_tokens: cfg.max_tokens,
            retry_attempts: cfg.retry_attempts.max(1),
            retry_backoff: Duration::from_secs(cfg.retry_backoff_secs),
        }
    }

    fn to_openai_messages(&self, messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m.role {
                Role::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .unwrap(),
                ),
                Role::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .unwrap(),
                ),
                Role::Assistant => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .unwrap(),
                ),
            })
            .collect()
    }

    async fn chat_once(&self, messages: &[Message]) -> Result<String, String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_tokens(self.max_tokens)
            .messages(self.to_openai_messages(messages))
            .build()
            .map_err(|e| e.to_string())?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| e.to_string())?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }

    async fn embed_once(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, String> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(EmbeddingInput::StringArray(inputs.to_vec()))
            .build()
            .map_err(|e| e.to_string())?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| e.to_string())?;

        Ok(response.data.into_iter().map(|e| e.embedding).collect())
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let mut last_err = String::new();
        for attempt in 1..=self.retry_attempts {
            match self.chat_once(messages).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "chat attempt failed");
                    last_err = e;
                    if attempt < self.retry_attempts {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
            }
        }
        Err(format!(
            "chat failed after {} attempts: {}",
            self.retry_attempts, last_err
        ))
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, String> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let mut last_err = String::new();
        for attempt in 1..=self.retry_attempts {
            match self.embed_once(inputs).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "embed attempt failed");
                    last_err = e;
                    if attempt < self.retry_attempts {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
            }
        }
        Err(format!(
            "embed failed after {} attempts: {}",
            self.retry_attempts, last_err
        ))
    }
}
