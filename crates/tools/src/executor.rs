//! Code execution service — the external collaborator that actually runs
//! generated analysis code against loaded datasets.
//!
//! Sandboxing and execution correctness are the sidecar's problem; this
//! module only defines the contract and a reqwest-based client for it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output of a successful code execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutput {
    /// The value of the `result` variable after execution.
    pub result: String,

    /// Captured stdout.
    #[serde(default)]
    pub stdout: String,
}

/// Failures from the execution service.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("Execution error: {0}")]
    Failed(String),

    #[error("Execution service unreachable: {0}")]
    Unreachable(String),
}

/// The contract between the analytics tools and the execution sidecar.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Run analysis code with the named datasets in scope.
    async fn run(&self, code: &str, aliases: &[String]) -> Result<ExecutionOutput, ExecutionError>;

    /// Run chart code and save the figure to `filepath`.
    async fn render_chart(
        &self,
        code: &str,
        aliases: &[String],
        filepath: &str,
    ) -> Result<(), ExecutionError>;
}

/// HTTP client for an execution sidecar exposing `/execute` and `/render`.
pub struct HttpExecutionService {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpExecutionService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl ExecutionService for HttpExecutionService {
    async fn run(&self, code: &str, aliases: &[String]) -> Result<ExecutionOutput, ExecutionError> {
        let response = self
            .client
            .post(format!("{}/execute", self.endpoint))
            .json(&ExecuteRequest {
                code,
                datasets: aliases,
                filepath: None,
            })
            .send()
            .await
            .map_err(|e| ExecutionError::Unreachable(e.to_string()))?;

        let body: ExecuteResponse = response
            .json()
            .await
            .map_err(|e| ExecutionError::Unreachable(format!("malformed response: {e}")))?;

        match body.status.as_str() {
            "success" => Ok(ExecutionOutput {
                result: body.result.unwrap_or_default(),
                stdout: body.stdout.unwrap_or_default(),
            }),
            _ => Err(ExecutionError::Failed(
                body.error_message.unwrap_or_else(|| "unknown error".into()),
            )),
        }
    }

    async fn render_chart(
        &self,
        code: &str,
        aliases: &[String],
        filepath: &str,
    ) -> Result<(), ExecutionError> {
        let response = self
            .client
            .post(format!("{}/render", self.endpoint))
            .json(&ExecuteRequest {
                code,
                datasets: aliases,
                filepath: Some(filepath),
            })
            .send()
            .await
            .map_err(|e| ExecutionError::Unreachable(e.to_string()))?;

        let body: ExecuteResponse = response
            .json()
            .await
            .map_err(|e| ExecutionError::Unreachable(format!("malformed response: {e}")))?;

        match body.status.as_str() {
            "success" => Ok(()),
            _ => Err(ExecutionError::Failed(
                body.error_message.unwrap_or_else(|| "unknown error".into()),
            )),
        }
    }
}

// ── Wire format ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    code: &'a str,
    datasets: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    filepath: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    status: String,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trailing_slash_stripped() {
        let service = HttpExecutionService::new("http://localhost:8791/");
        assert_eq!(service.endpoint, "http://localhost:8791");
    }

    #[test]
    fn success_response_parses() {
        let raw = r#"{"status": "success", "result": "42.5", "stdout": ""}"#;
        let parsed: ExecuteResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.status, "success");
        assert_eq!(parsed.result.as_deref(), Some("42.5"));
    }

    #[test]
    fn error_response_parses() {
        let raw = r#"{"status": "error", "error_message": "NameError: df"}"#;
        let parsed: ExecuteResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.status, "error");
        assert!(parsed.error_message.unwrap().contains("NameError"));
    }

    #[test]
    fn request_omits_absent_filepath() {
        let req = ExecuteRequest {
            code: "result = 1",
            datasets: &["sales".to_string()],
            filepath: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("filepath"));
    }
}
