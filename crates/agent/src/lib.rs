//! The Dataloom orchestration loop — the heart of the system.
//!
//! The agent follows a **Think → Act → Observe** cycle:
//!
//! 1. **Snapshot** the dataset catalog (pull-based refresh, once per iteration)
//! 2. **Assemble** the prompt (instructions + tools + catalog + recent turns)
//! 3. **Decide** via the model gateway (retries rate limits internally)
//! 4. **If terminal**: validate the answer and return
//! 5. **Otherwise dispatch** to the tool registry; failures come back as
//!    observations, never as faults
//! 6. **Fold** the turn into conversation memory, loop
//!
//! The loop continues until the model emits the terminal action or the
//! iteration budget is exhausted. Every path out of `run()` is a structured
//! [`dataloom_core::RunResult`].

pub mod context;
pub mod orchestrator;

pub use context::{ConversationMemory, MemoryWindow, PromptInput, assemble};
pub use orchestrator::AnalyticsAgent;

#[cfg(test)]
pub(crate) mod test_helpers;
