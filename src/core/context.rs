use serde::{Deserialize, Serialize};
use std::fmt;

/// Description used when no recognized context is selected.
pub const GENERAL_CONTEXT: &str = "General Chatbot";

/// Simulated RAG embedding context. Selects the canned description the stub
/// generator prefixes to its reply.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    #[default]
    Science,
    History,
    Technology,
}

impl ContextKey {
    pub const ALL: [ContextKey; 3] = [Self::Science, Self::History, Self::Technology];

    pub fn description(self) -> &'static str {
        match self {
            Self::Science => "This chatbot specializes in answering science-related questions.",
            Self::History => "This chatbot provides insights into historical events and figures.",
            Self::Technology => "This chatbot discusses the latest advancements in technology.",
        }
    }

    /// Case-insensitive lookup; unrecognized keys yield `None` so the caller
    /// can fall back to [`GENERAL_CONTEXT`] or keep its current selection.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "science" => Some(Self::Science),
            "history" => Some(Self::History),
            "technology" => Some(Self::Technology),
            _ => None,
        }
    }

    pub fn describe_opt(key: Option<Self>) -> &'static str {
        key.map_or(GENERAL_CONTEXT, Self::description)
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Science => write!(f, "Science"),
            Self::History => write!(f, "History"),
            Self::Technology => write!(f, "Technology"),
        }
    }
}
