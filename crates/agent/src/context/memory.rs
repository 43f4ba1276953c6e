//! Conversation memory — a fixed-capacity ring of past turns.
//!
//! Long-lived across queries: the agent carries what it did for earlier
//! questions into later prompts. Insertion evicts the oldest turn once the
//! ring is full; `len() <= capacity` holds after every operation.

use dataloom_core::run::Turn;
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 50;

/// A windowed view over recent turns.
///
/// The empty case is an explicit sentinel rather than an empty sequence —
/// the prompt assembler renders it as literal "no prior context" text so the
/// model is told, not left to infer.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryWindow {
    Empty,
    /// Oldest first; at most the requested number of turns.
    Recent(Vec<Turn>),
}

/// Capacity-bounded FIFO of completed turns.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a turn, evicting the oldest if the ring is full.
    pub fn append(&mut self, turn: Turn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// The most recent `last_n` turns, oldest first.
    pub fn window(&self, last_n: usize) -> MemoryWindow {
        if last_n == 0 || self.turns.is_empty() {
            return MemoryWindow::Empty;
        }
        let skip = self.turns.len().saturating_sub(last_n);
        MemoryWindow::Recent(self.turns.iter().skip(skip).cloned().collect())
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn turn(tag: &str) -> Turn {
        Turn::new("query", "thought", tag, Map::new(), "result")
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut memory = ConversationMemory::new(5);
        for i in 0..100 {
            memory.append(turn(&format!("t{i}")));
            assert!(memory.len() <= 5);
        }
        // Window larger than capacity still caps at capacity.
        match memory.window(10) {
            MemoryWindow::Recent(turns) => assert_eq!(turns.len(), 5),
            MemoryWindow::Empty => panic!("expected turns"),
        }
    }

    #[test]
    fn eviction_is_fifo() {
        let mut memory = ConversationMemory::new(3);
        for tag in ["a", "b", "c", "d"] {
            memory.append(turn(tag));
        }
        match memory.window(3) {
            MemoryWindow::Recent(turns) => {
                let actions: Vec<&str> = turns.iter().map(|t| t.action.as_str()).collect();
                assert_eq!(actions, vec!["b", "c", "d"]);
            }
            MemoryWindow::Empty => panic!("expected turns"),
        }
    }

    #[test]
    fn window_is_oldest_first() {
        let mut memory = ConversationMemory::default();
        memory.append(turn("first"));
        memory.append(turn("second"));
        memory.append(turn("third"));

        match memory.window(2) {
            MemoryWindow::Recent(turns) => {
                assert_eq!(turns[0].action, "second");
                assert_eq!(turns[1].action, "third");
            }
            MemoryWindow::Empty => panic!("expected turns"),
        }
    }

    #[test]
    fn empty_memory_yields_sentinel() {
        let memory = ConversationMemory::default();
        assert_eq!(memory.window(3), MemoryWindow::Empty);
    }

    #[test]
    fn window_zero_yields_sentinel() {
        let mut memory = ConversationMemory::default();
        memory.append(turn("a"));
        assert_eq!(memory.window(0), MemoryWindow::Empty);
    }

    #[test]
    fn clear_resets_to_sentinel() {
        let mut memory = ConversationMemory::default();
        memory.append(turn("a"));
        memory.append(turn("b"));
        memory.clear();
        assert!(memory.is_empty());
        assert_eq!(memory.window(5), MemoryWindow::Empty);
    }
}
