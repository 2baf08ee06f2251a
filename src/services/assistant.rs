//! The "Ana" intake assistant and the chat-completion gateway it talks to.

use std::sync::Arc;

use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::prompts::Prompts;
use crate::types::{ChatRole, ChatTurn};

const PROCESSING_FAILURE: &str = "Erro ao processar sua mensagem. Tente novamente.";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway rate limited the request")]
    RateLimited,

    #[error("gateway credits exhausted")]
    QuotaExhausted,

    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RateLimited => ApiError::RateLimitExceeded { upstream: true },
            GatewayError::QuotaExhausted => ApiError::QuotaExhausted,
            other => ApiError::upstream(PROCESSING_FAILURE, other),
        }
    }
}

/// An OpenAI-compatible chat-completion endpoint.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Returns the raw completion JSON on success.
    async fn complete(&self, request: &CreateChatCompletionRequest) -> Result<Value, GatewayError>;
}

pub struct HttpChatGateway {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpChatGateway {
    pub fn new(client: Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn complete(&self, request: &CreateChatCompletionRequest) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("HTTP request error calling AI gateway: {}", e);
                GatewayError::Transport(e)
            })?;

        let status = response.status();
        match status {
            s if s.is_success() => Ok(response.json::<Value>().await?),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("AI gateway rate limited the request");
                Err(GatewayError::RateLimited)
            }
            StatusCode::PAYMENT_REQUIRED => {
                error!("AI gateway reports exhausted credits");
                Err(GatewayError::QuotaExhausted)
            }
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read response body".to_string());
                error!(status = status.as_u16(), "Error response from AI gateway: {}", body);
                Err(GatewayError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// Rejects an empty history before any quota or upstream call is spent.
pub fn ensure_history(history: &[ChatTurn]) -> Result<(), ApiError> {
    if history.is_empty() {
        return Err(ApiError::validation("Envie ao menos uma mensagem"));
    }
    Ok(())
}

/// Stateless: every call sends the persona followed by the caller's history.
pub struct IntakeAssistant {
    gateway: Arc<dyn ChatGateway>,
    model: String,
}

impl IntakeAssistant {
    pub fn new(gateway: Arc<dyn ChatGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    pub fn build_request(&self, history: &[ChatTurn]) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 1);
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Prompts::INTAKE_PERSONA)
                .build()?
                .into(),
        );

        for turn in history {
            let message: ChatCompletionRequestMessage = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()?
                    .into(),
            };
            messages.push(message);
        }

        CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .build()
    }

    /// Produces the next assistant turn for the given history.
    pub async fn reply(&self, history: &[ChatTurn]) -> Result<Value, ApiError> {
        ensure_history(history)?;

        let request = self.build_request(history).map_err(|e| {
            error!("Failed to build chat completion request: {:?}", e);
            ApiError::upstream(PROCESSING_FAILURE, e)
        })?;

        info!(
            "Forwarding {} intake messages to model {}",
            history.len(),
            self.model
        );
        Ok(self.gateway.complete(&request).await?)
    }
}
