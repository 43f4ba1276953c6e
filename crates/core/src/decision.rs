//! Decision — the model's structured response for one loop iteration.
//!
//! The reasoning service is instructed to answer every prompt with a single
//! JSON object `{"thought": ..., "action": ..., "parameters": {...}}`.
//! `action` names a registered tool, or the reserved terminal marker `DONE`
//! (in which case `parameters.answer` carries the final answer).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The reserved action name that terminates a run.
pub const TERMINAL_ACTION: &str = "DONE";

/// A validated model decision: what to think, which tool to call, with what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub thought: String,

    /// A tool name, or [`TERMINAL_ACTION`].
    pub action: String,

    /// Tool parameters. Defaults to the empty mapping when absent.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Decision {
    /// Validate a raw JSON value into a Decision.
    ///
    /// `thought` and `action` are required strings; `parameters` defaults to
    /// an empty mapping. Some models put `answer` at the top level instead of
    /// inside `parameters` — for a terminal action that is folded in rather
    /// than rejected.
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let Value::Object(mut obj) = value else {
            return Err("decision must be a JSON object".into());
        };

        let thought = match obj.get("thought").and_then(Value::as_str) {
            Some(t) => t.to_string(),
            None => return Err("missing required field 'thought'".into()),
        };
        let action = match obj.get("action").and_then(Value::as_str) {
            Some(a) => a.to_string(),
            None => return Err("missing required field 'action'".into()),
        };

        let mut parameters = match obj.remove("parameters") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(format!(
                    "'parameters' must be an object, got {}",
                    type_name(&other)
                ));
            }
        };

        if action == TERMINAL_ACTION
            && !parameters.contains_key("answer")
            && let Some(answer) = obj.remove("answer")
        {
            parameters.insert("answer".into(), answer);
        }

        Ok(Self {
            thought,
            action,
            parameters,
        })
    }

    /// Whether this decision ends the run.
    pub fn is_terminal(&self) -> bool {
        self.action == TERMINAL_ACTION
    }

    /// The terminal answer, if present and non-empty.
    pub fn answer(&self) -> Option<&str> {
        self.parameters
            .get("answer")
            .and_then(Value::as_str)
            .filter(|a| !a.trim().is_empty())
    }

    /// The parameters as a JSON value, for tool dispatch.
    pub fn parameters_value(&self) -> Value {
        Value::Object(self.parameters.clone())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_decision_parses() {
        let decision = Decision::from_value(json!({
            "thought": "need the dataset list",
            "action": "list_datasets",
            "parameters": {}
        }))
        .unwrap();
        assert_eq!(decision.action, "list_datasets");
        assert!(!decision.is_terminal());
        assert!(decision.parameters.is_empty());
    }

    #[test]
    fn missing_action_is_rejected() {
        let err = Decision::from_value(json!({"thought": "hmm"})).unwrap_err();
        assert!(err.contains("action"));
    }

    #[test]
    fn missing_thought_is_rejected() {
        let err = Decision::from_value(json!({"action": "analyze"})).unwrap_err();
        assert!(err.contains("thought"));
    }

    #[test]
    fn parameters_default_to_empty() {
        let decision = Decision::from_value(json!({
            "thought": "t",
            "action": "list_datasets"
        }))
        .unwrap();
        assert!(decision.parameters.is_empty());
    }

    #[test]
    fn non_object_parameters_rejected() {
        let err = Decision::from_value(json!({
            "thought": "t",
            "action": "analyze",
            "parameters": [1, 2]
        }))
        .unwrap_err();
        assert!(err.contains("parameters"));
    }

    #[test]
    fn top_level_answer_is_folded_for_terminal_action() {
        let decision = Decision::from_value(json!({
            "thought": "finished",
            "action": "DONE",
            "answer": "42 rows"
        }))
        .unwrap();
        assert!(decision.is_terminal());
        assert_eq!(decision.answer(), Some("42 rows"));
    }

    #[test]
    fn empty_answer_counts_as_missing() {
        let decision = Decision::from_value(json!({
            "thought": "finished",
            "action": "DONE",
            "parameters": {"answer": "   "}
        }))
        .unwrap();
        assert!(decision.answer().is_none());
    }

    #[test]
    fn non_object_decision_rejected() {
        assert!(Decision::from_value(json!("just text")).is_err());
    }
}
