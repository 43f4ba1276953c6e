//! Model gateway — one structured decision per call, with bounded retry.
//!
//! Wraps a single [`Provider`] call and enforces the Decision contract on
//! its output. Two responsibilities, deliberately kept together because the
//! orchestrator should see exactly one failure surface:
//!
//! - **Retry/backoff**: rate-limit-classified failures are retried with
//!   exponential backoff (`base * 2^attempt`), sleeping inline — the call is
//!   a blocking operation from the orchestrator's point of view. Any other
//!   provider failure is fatal on the spot, no retry.
//! - **Parsing**: the response text must be a single JSON object. If direct
//!   parsing fails, one fenced ```json block is extracted and parsed; after
//!   that the response is a protocol error, which is a format problem and
//!   never retried.

use dataloom_core::decision::Decision;
use dataloom_core::error::GatewayError;
use dataloom_core::provider::{GenerateRequest, Provider};
use dataloom_core::retry::RetryPolicy;
use std::sync::Arc;
use tracing::{debug, warn};

/// The gateway between the orchestrator and the reasoning service.
pub struct ModelGateway {
    provider: Arc<dyn Provider>,
    policy: RetryPolicy,
    temperature: f32,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
            temperature: 0.1,
        }
    }

    /// Override the retry schedule.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the decision-prompt temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask the model what to do next.
    ///
    /// Returns a validated [`Decision`], or fails with
    /// [`GatewayError::RateLimitExceeded`] once the retry budget is spent,
    /// [`GatewayError::Provider`] on a fatal provider failure, or
    /// [`GatewayError::Protocol`] when the response cannot be parsed into a
    /// Decision.
    pub async fn decide(&self, prompt: &str) -> Result<Decision, GatewayError> {
        let text = self.generate_with_retry(prompt).await?;
        parse_decision(&text)
    }

    async fn generate_with_retry(&self, prompt: &str) -> Result<String, GatewayError> {
        for attempt in 0..self.policy.max_retries {
            let request = GenerateRequest::new(prompt).with_temperature(self.temperature);

            match self.provider.generate(request).await {
                Ok(response) => {
                    debug!(
                        provider = self.provider.name(),
                        attempt, "gateway: provider responded"
                    );
                    return Ok(response.text);
                }
                Err(e) => {
                    let message = e.to_string();
                    if self.policy.should_retry(&message, attempt) {
                        let delay = self.policy.delay_for(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max = self.policy.max_retries,
                            delay_secs = delay.as_secs_f64(),
                            "gateway: rate limited, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    } else if dataloom_core::retry::is_rate_limited(&message) {
                        return Err(GatewayError::RateLimitExceeded {
                            attempts: self.policy.max_retries,
                        });
                    } else {
                        return Err(GatewayError::Provider(e));
                    }
                }
            }
        }

        Err(GatewayError::RateLimitExceeded {
            attempts: self.policy.max_retries,
        })
    }
}

/// Parse response text into a validated Decision.
///
/// Direct JSON parse first; one markdown-fence-stripping fallback; then
/// give up with a protocol error carrying a bounded excerpt.
pub fn parse_decision(text: &str) -> Result<Decision, GatewayError> {
    let trimmed = text.trim();

    let value = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(v) => v,
        Err(_) => match extract_fenced_json(trimmed) {
            Some(inner) => serde_json::from_str::<serde_json::Value>(inner)
                .map_err(|e| GatewayError::Protocol(format!("invalid JSON in fence: {e}")))?,
            None => {
                return Err(GatewayError::Protocol(format!(
                    "response is not JSON: {}",
                    excerpt(trimmed, 200)
                )));
            }
        },
    };

    Decision::from_value(value).map_err(GatewayError::Protocol)
}

/// Pull the body out of the first ```json ... ``` fence, if any.
fn extract_fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

fn excerpt(text: &str, budget: usize) -> String {
    if text.chars().count() > budget {
        text.chars().take(budget).collect()
    } else {
        text.to_string()
    }
}
