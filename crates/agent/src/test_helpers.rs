//! Shared test helpers for orchestrator tests.

use dataloom_core::error::ProviderError;
use dataloom_core::provider::{GenerateRequest, GenerateResponse, Provider};
use std::sync::Mutex;

/// A provider that plays back a scripted sequence of results, one per call,
/// and records every prompt it receives.
///
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    script: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
    call_count: Mutex<usize>,
}

impl SequentialMockProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script),
            prompts: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    /// Script of decision payloads, all successful.
    pub fn decisions(payloads: Vec<String>) -> Self {
        Self::new(payloads.into_iter().map(Ok).collect())
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let mut script = self.script.lock().unwrap();

        assert!(
            !script.is_empty(),
            "SequentialMockProvider: no more responses (call #{})",
            *count + 1
        );

        *count += 1;
        self.prompts.lock().unwrap().push(request.prompt);

        script.remove(0).map(|text| GenerateResponse {
            text,
            model: "mock-model".into(),
        })
    }
}

/// Build a decision payload for a tool action.
pub fn make_decision(thought: &str, action: &str, parameters: serde_json::Value) -> String {
    serde_json::json!({
        "thought": thought,
        "action": action,
        "parameters": parameters,
    })
    .to_string()
}

/// Build a terminal decision payload with the given answer.
pub fn make_done(answer: &str) -> String {
    make_decision(
        "I have everything I need",
        "DONE",
        serde_json::json!({ "answer": answer }),
    )
}
