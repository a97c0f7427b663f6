use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::context::ContextKey;
use crate::core::message::Message;

/// Stable internal identifier. The display name is a separate mutable
/// attribute, so renaming never migrates a map key.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub context: ContextKey,
    pub log: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(name: String, context: ContextKey, log: Vec<Message>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            name,
            context,
            log,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_message(&mut self, message: Message) {
        self.log.push(message);
        self.updated_at = Utc::now();
    }

    /// Overwrite the whole log (write-through from the active draft).
    pub fn set_log(&mut self, log: Vec<Message>) {
        self.log = log;
        self.updated_at = Utc::now();
    }
}
