//! Language-model boundary: prompt in, completion text out, plus the
//! extraction and read-only classification applied to completions.

pub mod extractor;
pub mod guardrail;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::prompt::PromptContext;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation endpoint rejected the credentials (status {status})")]
    Auth { status: u16 },

    #[error("Generation endpoint returned status {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Generation response had no usable completion: {0}")]
    MalformedResponse(String),

    #[error("Generation returned an empty completion")]
    EmptyCompletion,
}

/// Text-in/text-out boundary to the language model. Implementations have
/// no knowledge of SQL semantics and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(&self, prompt: &PromptContext) -> Result<String, GenerationError>;
}

/// One completion's passage through extraction and classification.
/// Created per request and discarded with the response, never persisted.
#[derive(Debug, Clone)]
pub struct GeneratedQuery {
    pub raw: String,
    pub sql: String,
    pub is_select_only: bool,
}

impl GeneratedQuery {
    pub fn from_completion(raw: String) -> Self {
        let sql = extractor::extract(&raw);
        let is_select_only = guardrail::validate(&sql).is_ok();
        Self {
            raw,
            sql,
            is_select_only,
        }
    }
}
