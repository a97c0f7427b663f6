use std::collections::HashMap;

use crate::core::error::RenameError;
use crate::core::session::{Session, SessionId};

/// In-memory session store: a display-ordered list of stable ids plus the
/// sessions they point at. Every id in `order` has an entry in `sessions`
/// and vice versa.
#[derive(Debug, Default)]
pub struct SessionStore {
    order: Vec<SessionId>,
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Append a session at the end of the display order. The caller is
    /// responsible for name uniqueness (see [`SessionStore::unique_name`]).
    pub fn insert(&mut self, session: Session) -> SessionId {
        let id = session.id.clone();
        self.order.push(id.clone());
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Single validation point for index-addressed operations. Out-of-range
    /// indices resolve to `None`; callers treat that as a no-op.
    pub fn get(&self, index: usize) -> Option<&Session> {
        let id = self.order.get(index)?;
        self.sessions.get(id)
    }

    pub fn get_by_id(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_by_id_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn position_of(&self, id: &SessionId) -> Option<usize> {
        self.order.iter().position(|other| other == id)
    }

    /// Session names in display order.
    pub fn names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .map(|session| session.name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.sessions.values().any(|session| session.name == name)
    }

    /// Disambiguate a generated name: "base", "base (2)", "base (3)", ...
    pub fn unique_name(&self, base: &str) -> String {
        if !self.contains_name(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base} ({n})");
            if !self.contains_name(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Change a session's display name in place. Position and log are
    /// preserved; collisions and empty names are rejected with no state
    /// change.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<(), RenameError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(RenameError::EmptyName);
        }
        let id = self.order.get(index).ok_or(RenameError::NotFound)?.clone();
        let current = self.sessions.get(&id).ok_or(RenameError::NotFound)?;
        if current.name != new_name && self.contains_name(new_name) {
            return Err(RenameError::NameTaken(new_name.to_string()));
        }
        if let Some(session) = self.sessions.get_mut(&id) {
            session.name = new_name.to_string();
            session.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    /// Remove the session at `index` from both the order and the map.
    /// Invalid indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Session> {
        if index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);
        self.sessions.remove(&id)
    }
}
