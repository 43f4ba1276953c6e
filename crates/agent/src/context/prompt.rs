//! Prompt assembly — a pure function from loop state to prompt text.
//!
//! No I/O, no side effects, deterministic for identical inputs: the catalog
//! is a BTreeMap and tool specs arrive name-sorted from the registry, so the
//! rendered sections never reorder between runs. Determinism is what makes
//! scripted-provider tests reproducible.

use crate::context::memory::MemoryWindow;
use dataloom_core::catalog::CatalogSnapshot;
use dataloom_core::tool::ToolSpec;

/// Everything the assembler needs for one iteration.
pub struct PromptInput<'a> {
    pub query: &'a str,
    pub iteration: u32,
    pub max_iterations: u32,
    pub tool_specs: &'a [ToolSpec],
    pub catalog: &'a CatalogSnapshot,
    pub window: &'a MemoryWindow,
}

/// Maximum characters of a thought rendered into the context section.
const THOUGHT_EXCERPT: usize = 200;
/// Maximum characters of a result rendered into the context section.
const RESULT_EXCERPT: usize = 300;

/// Compose the full prompt for one iteration.
pub fn assemble(input: &PromptInput) -> String {
    format!(
        "# Data Analytics Agent\n\n\
         You are an expert data analyst working in a Think -> Act -> Observe loop.\n\
         Each turn: reason about what the user needs, pick exactly one tool (or finish),\n\
         observe the result, and decide whether to continue.\n\n\
         {tools}\n\n\
         {datasets}\n\n\
         {context}\n\n\
         ## Iteration: {iteration} / {max_iterations}\n\n\
         ## Current User Query\n\n\
         {query}\n\n\
         {format}",
        tools = render_tools(input.tool_specs),
        datasets = render_catalog(input.catalog),
        context = render_window(input.window),
        iteration = input.iteration,
        max_iterations = input.max_iterations,
        query = input.query,
        format = RESPONSE_FORMAT,
    )
}

const RESPONSE_FORMAT: &str = "## Response Format\n\n\
    Respond with a single JSON object only:\n\n\
    {\"thought\": \"step-by-step reasoning\", \"action\": \"tool_name or DONE\", \"parameters\": {}}\n\n\
    To finish, use the DONE action and put the complete answer in parameters:\n\n\
    {\"thought\": \"I have everything I need\", \"action\": \"DONE\", \"parameters\": {\"answer\": \"...\"}}\n\n\
    Remember: respond with valid JSON only!";

fn render_tools(specs: &[ToolSpec]) -> String {
    let mut out = String::from("## Available Tools\n");
    for spec in specs {
        out.push_str(&format!(
            "\n### {}\n{}\n\nParameters: {}\n",
            spec.name,
            spec.description,
            serde_json::to_string(&spec.parameters).unwrap_or_else(|_| "{}".into())
        ));
    }
    out
}

fn render_catalog(catalog: &CatalogSnapshot) -> String {
    let mut out = String::from("## Loaded Datasets\n\n");
    if catalog.is_empty() {
        out.push_str("No datasets loaded. Load data first!");
        return out;
    }
    let lines: Vec<String> = catalog
        .iter()
        .map(|(alias, shape)| {
            format!(
                "- '{}': {} rows x {} columns | Columns: {}",
                alias,
                shape.row_count,
                shape.column_names.len(),
                shape.column_names.join(", ")
            )
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

fn render_window(window: &MemoryWindow) -> String {
    let mut out = String::from("## Recent Context\n\n");
    match window {
        MemoryWindow::Empty => out.push_str("No previous conversation."),
        MemoryWindow::Recent(turns) => {
            let rendered: Vec<String> = turns
                .iter()
                .enumerate()
                .map(|(i, turn)| {
                    format!(
                        "**Turn {}:**\n- Thought: {}\n- Action: {}\n- Result: {}",
                        i + 1,
                        excerpt(&turn.thought, THOUGHT_EXCERPT),
                        turn.action,
                        excerpt(&turn.result_summary, RESULT_EXCERPT)
                    )
                })
                .collect();
            out.push_str(&rendered.join("\n\n"));
        }
    }
    out
}

fn excerpt(text: &str, budget: usize) -> String {
    if text.chars().count() > budget {
        let truncated: String = text.chars().take(budget).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}
