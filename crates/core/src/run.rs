//! Run-level types: the per-iteration [`Turn`] record and the terminal
//! [`RunResult`] of one full query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One completed loop iteration, immutable once appended to memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// The user query this iteration served.
    pub query: String,

    /// The model's reasoning for the iteration.
    pub thought: String,

    /// The dispatched action (tool name, terminal marker, or an error tag).
    pub action: String,

    /// The parameters the action was dispatched with.
    pub parameters: Map<String, Value>,

    /// Length-bounded summary of the observation.
    pub result_summary: String,

    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(
        query: impl Into<String>,
        thought: impl Into<String>,
        action: impl Into<String>,
        parameters: Map<String, Value>,
        result_summary: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            thought: thought.into(),
            action: action.into(),
            parameters,
            result_summary: result_summary.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

/// A chart produced during a run by the visualize tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub filepath: String,
    pub chart_type: String,
}

/// The structured outcome of one full query. Every path through the
/// orchestrator — success, gateway failure, protocol error, missing answer,
/// budget exhaustion — produces exactly one of these; nothing panics out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: Uuid,

    pub status: RunStatus,

    /// The final answer, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// The failure reason, on error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The iteration the run ended in (1-based).
    pub iterations_used: u32,

    /// Every turn recorded during this run, oldest first.
    pub turn_history: Vec<Turn>,

    /// Charts rendered during this run, in order of creation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visualizations: Vec<ChartArtifact>,
}

impl RunResult {
    pub fn success(
        answer: impl Into<String>,
        iterations_used: u32,
        turn_history: Vec<Turn>,
        visualizations: Vec<ChartArtifact>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Success,
            answer: Some(answer.into()),
            error: None,
            iterations_used,
            turn_history,
            visualizations,
        }
    }

    pub fn failure(
        error: impl Into<String>,
        iterations_used: u32,
        turn_history: Vec<Turn>,
        visualizations: Vec<ChartArtifact>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Error,
            answer: None,
            error: Some(error.into()),
            iterations_used,
            turn_history,
            visualizations,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
