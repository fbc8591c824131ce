//! Chat assistant - passthrough to the Workers AI inference endpoint

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::ChatConfig;

pub const ACCOUNT_ID_VAR: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const API_TOKEN_VAR: &str = "CLOUDFLARE_API_TOKEN";

/// Reply used when the provider answers without any text
pub const EMPTY_REPLY: &str = "No response from the assistant";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat is not configured: set CLOUDFLARE_ACCOUNT_ID and CLOUDFLARE_API_TOKEN")]
    NotConfigured,

    #[error("request to the inference API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("inference API returned malformed JSON: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

#[derive(Debug, Clone)]
pub struct ChatCredentials {
    pub account_id: String,
    pub api_token: String,
}

impl ChatCredentials {
    /// Read both credentials from the process environment
    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Empty values count as missing
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChatError> {
        let get = |name| lookup(name).filter(|v| !v.trim().is_empty());
        match (get(ACCOUNT_ID_VAR), get(API_TOKEN_VAR)) {
            (Some(account_id), Some(api_token)) => Ok(Self {
                account_id,
                api_token,
            }),
            _ => Err(ChatError::NotConfigured),
        }
    }
}

/// Which credentials are present, without their values
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCheck {
    pub is_configured: bool,
    pub account_id: &'static str,
    pub api_token: &'static str,
}

impl EnvironmentCheck {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name| lookup(name).is_some_and(|v| !v.trim().is_empty());
        let mark = |set: bool| if set { "✓ Set" } else { "✗ Missing" };
        let account = present(ACCOUNT_ID_VAR);
        let token = present(API_TOKEN_VAR);
        Self {
            is_configured: account && token,
            account_id: mark(account),
            api_token: mark(token),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// One-shot, non-streaming client for a single model
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
    credentials: Option<ChatCredentials>,
}

impl ChatClient {
    /// `credentials` may be absent; every call then fails with `NotConfigured`
    pub fn new(config: ChatConfig, credentials: Option<ChatCredentials>) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn endpoint(&self, credentials: &ChatCredentials) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.config.api_base.trim_end_matches('/'),
            credentials.account_id,
            self.config.model
        )
    }

    /// Run the model and return the provider's JSON body as is
    pub async fn run(&self, messages: &[ChatMessage]) -> Result<Value, ChatError> {
        let credentials = self.credentials.as_ref().ok_or(ChatError::NotConfigured)?;

        tracing::debug!(
            "Calling {} with {} messages",
            self.config.model,
            messages.len()
        );

        let body = json!({
            "messages": messages,
            "stream": false,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .http
            .post(self.endpoint(credentials))
            .bearer_auth(&credentials.api_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Inference API error {}: {}", status, text);
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| ChatError::MalformedResponse(e.to_string()))
    }

    /// The assistant's reply to a conversation
    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ChatError> {
        let result = self.run(messages).await?;
        let content = result["result"]["response"]
            .as_str()
            .filter(|s| !s.is_empty())
            .unwrap_or(EMPTY_REPLY);
        Ok(ChatMessage::assistant(content))
    }
}
