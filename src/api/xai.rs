use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;
use url::Url;

use crate::ForgeError;
use crate::config::XaiConfig;

/// One message in an OpenAI-compatible chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Per-call generation options.
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    /// Ask the provider for strict JSON output (`response_format: json_object`).
    pub json_mode: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: None,
            json_mode: true,
        }
    }
}

/// Completion content plus token accounting when the provider reports it.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub content: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// Thin client over the xAI chat-completions endpoint (OpenAI-compatible).
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl ChatClient {
    pub fn new(cfg: &XaiConfig) -> Result<Self, ForgeError> {
        let http = reqwest::Client::builder()
            .user_agent("threadforge/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()?;
        // Url::join drops the last path segment without a trailing slash
        let mut base = cfg.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let endpoint = base.join("chat/completions")?;
        Ok(Self {
            http,
            endpoint,
            api_key: cfg.api_key.clone(),
        })
    }

    fn retry_policy() -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(3))
            .with_max_times(3)
            .with_jitter()
    }

    /// Run one chat completion. 5xx answers are retried with backoff;
    /// other non-2xx statuses map straight to `UpstreamStatus`.
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<ChatCompletion, ForgeError> {
        let mut payload = json!({
            "model": model,
            "messages": messages,
            "temperature": options.temperature,
        });
        if let Some(max_tokens) = options.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }
        if options.json_mode {
            payload["response_format"] = json!({ "type": "json_object" });
        }

        let resp = (|| async {
            let resp = self
                .http
                .post(self.endpoint.clone())
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await?;
            if resp.status().is_server_error() {
                let status = resp.status();
                let err = resp.error_for_status().unwrap_err();
                error!("chat completion server error (will retry): {}", status);
                return Err(err);
            }
            Ok(resp)
        })
        .retry(Self::retry_policy())
        .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ForgeError::UpstreamStatus(
                axum::http::StatusCode::from_u16(status.as_u16())
                    .unwrap_or(axum::http::StatusCode::BAD_GATEWAY),
            ));
        }

        let body: Value = resp.json().await?;
        Ok(parse_completion(&body))
    }
}

fn parse_completion(body: &Value) -> ChatCompletion {
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let usage = &body["usage"];
    ChatCompletion {
        content,
        prompt_tokens: usage["prompt_tokens"].as_u64(),
        completion_tokens: usage["completion_tokens"].as_u64(),
        total_tokens: usage["total_tokens"].as_u64(),
    }
}
