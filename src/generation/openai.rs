//! Chat-completions client for SQL generation.
//!
//! One outbound request per question against an OpenAI-compatible
//! endpoint. Decoding is pinned to zero temperature so identical prompts
//! are as reproducible as the model allows; the model remains a black box,
//! so this removes one source of variance rather than guaranteeing one.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ServerConfig;
use crate::prompt::PromptContext;

use super::{GenerationError, SqlGenerator};

const SYSTEM_MESSAGE: &str = "You generate SQL queries.";

pub struct OpenAiGenerator {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.llm_url.trim_end_matches('/').to_string(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
        }
    }
}

#[async_trait]
impl SqlGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &PromptContext) -> Result<String, GenerationError> {
        let body = json!({
            "model": self.model.as_str(),
            "messages": [
                { "role": "system", "content": SYSTEM_MESSAGE },
                { "role": "user", "content": prompt.text.as_str() },
            ],
            "temperature": 0,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GenerationError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::MalformedResponse("no message content".to_string()))?;

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }
        Ok(content)
    }
}
