//! Bounded conversation memory
//!
//! A small FIFO log of recent interactions with a naive keyword-overlap
//! relevance lookup. Each instance owns its entries; nothing is shared or
//! persisted. This is deliberately not a vector store: two overlapping words
//! within the last few turns is all the recall the assistant needs.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::VecDeque;

/// Default number of interactions kept
const DEFAULT_MAX_HISTORY: usize = 10;

/// How many recent interactions the relevance lookup scans
const RELEVANCE_WINDOW: usize = 5;

/// Minimum overlapping query words for an interaction to count as relevant
const RELEVANCE_THRESHOLD: usize = 2;

/// A single recorded interaction
#[derive(Debug, Clone)]
pub struct Interaction {
    /// When the interaction happened
    pub timestamp: DateTime<Utc>,
    /// The user's input
    pub user_input: String,
    /// The assistant's response
    pub response: String,
    /// Free-form annotations (source flags, timings)
    pub metadata: HashMap<String, String>,
}

/// Bounded recent-interaction log
#[derive(Debug)]
pub struct ConversationMemory {
    entries: VecDeque<Interaction>,
    max_history: usize,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationMemory {
    /// Create a memory with the default capacity
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    /// Create a memory with a custom capacity
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Record an interaction, evicting the oldest entries past the cap
    pub fn add_interaction(
        &mut self,
        user_input: impl Into<String>,
        response: impl Into<String>,
        metadata: Option<HashMap<String, String>>,
    ) {
        self.entries.push_back(Interaction {
            timestamp: Utc::now(),
            user_input: user_input.into(),
            response: response.into(),
            metadata: metadata.unwrap_or_default(),
        });

        while self.entries.len() > self.max_history {
            self.entries.pop_front();
        }
    }

    /// Format the most recent interactions as alternating User/Assistant lines
    pub fn history_lines(&self, limit: Option<usize>) -> Vec<String> {
        let limit = limit.unwrap_or(self.max_history);
        let skip = self.entries.len().saturating_sub(limit);

        let mut lines = Vec::new();
        for interaction in self.entries.iter().skip(skip) {
            lines.push(format!("User: {}", interaction.user_input));
            lines.push(format!("Assistant: {}", interaction.response));
        }
        lines
    }

    /// Find context relevant to a query by keyword overlap
    ///
    /// Scans the last few interactions for ones sharing at least two words
    /// with the query and formats the last three of those as context.
    pub fn relevant_context(&self, query: &str) -> String {
        let query_lower = query.to_lowercase();
        let query_words: Vec<&str> = query_lower.split_whitespace().collect();

        let skip = self.entries.len().saturating_sub(RELEVANCE_WINDOW);
        let relevant: Vec<&Interaction> = self
            .entries
            .iter()
            .skip(skip)
            .filter(|interaction| {
                let combined =
                    format!("{} {}", interaction.user_input, interaction.response).to_lowercase();
                let matches = query_words.iter().filter(|w| combined.contains(**w)).count();
                matches >= RELEVANCE_THRESHOLD
            })
            .collect();

        if relevant.is_empty() {
            return "No relevant previous conversations.".to_string();
        }

        let mut lines = vec!["Previous relevant conversations:".to_string()];
        let skip = relevant.len().saturating_sub(3);
        for interaction in relevant.into_iter().skip(skip) {
            lines.push(format!("User: {}", interaction.user_input));
            lines.push(format!("Assistant: {}", interaction.response));
        }
        lines.join("\n")
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of recorded interactions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the memory is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
