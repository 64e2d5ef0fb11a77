//! Optional text-generation backends. The analysis pipeline never calls
//! these; they exist so narrative summaries can be layered on later without
//! touching the core.

use async_trait::async_trait;
use common::config::{EngineConfig, LlmProvider};
use common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::utils::retry::{RetryPolicy, retry_with_backoff};

const MOCK_ECHO_CHARS: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Deterministic stand-in that echoes the last message without any I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockChatModel;

#[async_trait]
impl ChatModel for MockChatModel {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let last = messages
            .last()
            .ok_or_else(|| Error::Llm("no messages to respond to".to_string()))?;
        let echoed: String = last.content.chars().take(MOCK_ECHO_CHARS).collect();
        Ok(format!("[mock-llm-response]: {}", echoed))
    }
}

/// Wraps a model so transient failures are retried with exponential backoff.
pub struct RetryingChatModel<M> {
    inner: M,
    policy: RetryPolicy,
}

impl<M: ChatModel> RetryingChatModel<M> {
    pub fn new(inner: M) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: M, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<M: ChatModel> ChatModel for RetryingChatModel<M> {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        retry_with_backoff(self.policy, || self.inner.generate(messages)).await
    }
}

/// Builds the backend named by `config.llm_provider`.
pub fn build_chat_model(config: &EngineConfig) -> Result<Box<dyn ChatModel>> {
    match config.llm_provider {
        LlmProvider::Mock => Ok(Box::new(RetryingChatModel::new(MockChatModel))),
        provider @ (LlmProvider::OpenAi | LlmProvider::AzureOpenAi) => {
            Err(Error::UnsupportedProvider(provider.to_string()))
        }
    }
}
