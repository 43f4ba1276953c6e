//! Provider trait — the abstraction over the reasoning service.
//!
//! A Provider knows how to send one prompt to an LLM and return the raw
//! response text. Structured-output enforcement, retry, and backoff live a
//! layer up in the model gateway — providers only translate transport and
//! status failures into [`ProviderError`]s.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One text-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,

    /// Sampling temperature. Decision prompts run cold.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Number of candidates to request. The gateway only reads the first.
    #[serde(default = "default_candidate_count")]
    pub candidate_count: u32,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_candidate_count() -> u32 {
    1
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: default_temperature(),
            candidate_count: default_candidate_count(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// The raw response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text (expected by callers to be a JSON decision or a
    /// fenced code block, depending on the prompt).
    pub text: String,

    /// Which model actually responded.
    pub model: String,
}

/// The core Provider trait.
///
/// Every reasoning backend implements this; the gateway and the
/// code-generating tools call `generate()` without knowing which provider is
/// behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send one prompt, return the raw response text.
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<GenerateResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_run_cold() {
        let req = GenerateRequest::new("decide");
        assert!((req.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(req.candidate_count, 1);
    }

    #[test]
    fn temperature_override() {
        let req = GenerateRequest::new("generate code").with_temperature(0.7);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }
}
