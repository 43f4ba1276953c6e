//! The orchestrator — drives the bounded Think → Act → Observe loop.
//!
//! One `AnalyticsAgent` owns one conversation: memory and the dataset
//! catalog binding live across queries, decisions and tool results live
//! within one iteration. `run(&mut self)` takes an exclusive borrow, which
//! serializes concurrent use of the same agent at the type level — memory is
//! not safe for concurrent mutation.

use crate::context::memory::ConversationMemory;
use crate::context::prompt::{PromptInput, assemble};
use dataloom_core::catalog::CatalogSource;
use dataloom_core::error::GatewayError;
use dataloom_core::run::{ChartArtifact, RunResult, Turn};
use dataloom_core::tool::ToolRegistry;
use dataloom_gateway::ModelGateway;
use serde_json::Map;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Action tag recorded in memory when the model's own output failed
/// validation — the model sees its malformed attempt in later context.
const PROTOCOL_ERROR_ACTION: &str = "<protocol-error>";

/// The ReAct orchestrator for data-analysis queries.
pub struct AnalyticsAgent {
    gateway: ModelGateway,
    registry: ToolRegistry,
    catalog: Arc<dyn CatalogSource>,
    memory: ConversationMemory,
    max_iterations: u32,
    context_window: usize,
    summary_budget: usize,
}

impl AnalyticsAgent {
    pub fn new(
        gateway: ModelGateway,
        registry: ToolRegistry,
        catalog: Arc<dyn CatalogSource>,
    ) -> Self {
        Self {
            gateway,
            registry,
            catalog,
            memory: ConversationMemory::default(),
            max_iterations: 20,
            context_window: 3,
            summary_budget: 500,
        }
    }

    /// Set the iteration budget per query.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the conversation memory capacity.
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory = ConversationMemory::new(capacity);
        self
    }

    /// Set how many recent turns are rendered into each prompt.
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    /// Set the character budget for per-turn result summaries.
    pub fn with_summary_budget(mut self, budget: usize) -> Self {
        self.summary_budget = budget;
        self
    }

    /// Read access to the conversation memory.
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Forget all recorded turns.
    pub fn clear_memory(&mut self) {
        self.memory.clear();
        info!("conversation memory cleared");
    }

    /// Answer one query. Never panics or returns a raw error — every path
    /// produces a structured [`RunResult`].
    pub async fn run(&mut self, query: &str) -> RunResult {
        let tool_specs = self.registry.specs();
        let mut turn_history: Vec<Turn> = Vec::new();
        let mut visualizations: Vec<ChartArtifact> = Vec::new();

        info!(query, max_iterations = self.max_iterations, "run starting");

        for iteration in 1..=self.max_iterations {
            // Pull-based refresh: tools may have changed the dataset
            // bindings since the last iteration.
            let catalog = self.catalog.snapshot();
            let window = self.memory.window(self.context_window);

            let prompt = assemble(&PromptInput {
                query,
                iteration,
                max_iterations: self.max_iterations,
                tool_specs: &tool_specs,
                catalog: &catalog,
                window: &window,
            });
            debug!(iteration, prompt_chars = prompt.len(), "prompt assembled");

            let decision = match self.gateway.decide(&prompt).await {
                Ok(decision) => decision,
                Err(GatewayError::Protocol(message)) => {
                    // Record the malformed attempt so the model sees it in
                    // future context, then abort — the same output pattern
                    // will not self-correct without new input.
                    warn!(iteration, %message, "decision failed validation");
                    let turn = Turn::new(
                        query,
                        "",
                        PROTOCOL_ERROR_ACTION,
                        Map::new(),
                        format!("Error: {message}"),
                    );
                    self.memory.append(turn.clone());
                    turn_history.push(turn);
                    return RunResult::failure(
                        format!("protocol error: {message}"),
                        iteration,
                        turn_history,
                        visualizations,
                    );
                }
                Err(e) => {
                    warn!(iteration, error = %e, "gateway failed, aborting run");
                    return RunResult::failure(
                        format!("gateway failure: {e}"),
                        iteration,
                        turn_history,
                        visualizations,
                    );
                }
            };

            info!(
                iteration,
                thought = %decision.thought,
                action = %decision.action,
                "decision"
            );

            if decision.is_terminal() {
                return match decision.answer() {
                    Some(answer) => {
                        info!(iteration, "run finished with answer");
                        RunResult::success(answer, iteration, turn_history, visualizations)
                    }
                    None => RunResult::failure(
                        "agent finished without an answer",
                        iteration,
                        turn_history,
                        visualizations,
                    ),
                };
            }

            let result = self
                .registry
                .invoke(&decision.action, decision.parameters_value())
                .await;

            if decision.action == "visualize"
                && let Some(metadata) = result.metadata()
                && let Some(filepath) = metadata["filepath"].as_str()
            {
                visualizations.push(ChartArtifact {
                    filepath: filepath.to_string(),
                    chart_type: metadata["chart_type"]
                        .as_str()
                        .unwrap_or("chart")
                        .to_string(),
                });
            }

            let turn = Turn::new(
                query,
                &decision.thought,
                &decision.action,
                decision.parameters.clone(),
                result.summary(self.summary_budget),
            );
            self.memory.append(turn.clone());
            turn_history.push(turn);
        }

        warn!(max_iterations = self.max_iterations, "iteration budget exhausted");
        RunResult::failure(
            format!("did not complete within {} iterations", self.max_iterations),
            self.max_iterations,
            turn_history,
            visualizations,
        )
    }
}
