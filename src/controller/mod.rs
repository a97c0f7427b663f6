use std::sync::Arc;

use tracing::debug;

use crate::core::config::NamingPolicy;
use crate::core::context::ContextKey;
use crate::core::error::{GeneratorError, RenameError};
use crate::core::message::{Message, UserInput};
use crate::core::session::{Session, SessionId};
use crate::core::store::SessionStore;
use crate::generator::ResponseGenerator;

/// Maximum characters of the opening message used for a generated name
/// under [`NamingPolicy::FirstMessage`].
const NAME_PREFIX_LEN: usize = 20;

/// Orchestrates turn handling and session lifecycle. Owns the store, the
/// active pointer and the in-progress draft log; the UI layer serializes
/// calls, so all methods take `&mut self` and run to completion.
///
/// The draft is the single source of truth for the active log. When a
/// session is active, every accepted turn is written through to the store
/// (overwrite-in-place, last writer wins).
pub struct SessionController {
    store: SessionStore,
    generator: Arc<dyn ResponseGenerator>,
    naming: NamingPolicy,
    context: ContextKey,
    active: Option<SessionId>,
    draft: Vec<Message>,
}

impl SessionController {
    pub fn new(
        generator: Arc<dyn ResponseGenerator>,
        naming: NamingPolicy,
        context: ContextKey,
    ) -> Self {
        Self {
            store: SessionStore::new(),
            generator,
            naming,
            context,
            active: None,
            draft: Vec::new(),
        }
    }

    pub fn context(&self) -> ContextKey {
        self.context
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn session_names(&self) -> Vec<&str> {
        self.store.names()
    }

    /// The log currently receiving turns.
    pub fn active_log(&self) -> &[Message] {
        &self.draft
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref().and_then(|id| self.store.get_by_id(id))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().and_then(|id| self.store.position_of(id))
    }

    /// Synthesized greeting shown when the app starts. Display-only; it is
    /// not part of any log.
    pub fn startup_welcome(&self) -> Message {
        Message::assistant(format!(
            "👋 Welcome! This chatbot is using the **{}** context.",
            self.context
        ))
    }

    /// Pre-load archived sessions (persisted-store variant). Replaces the
    /// current store contents; the active pointer resets.
    pub fn seed(&mut self, sessions: Vec<Session>) {
        self.store = SessionStore::new();
        for session in sessions {
            self.store.insert(session);
        }
        self.active = None;
        self.draft.clear();
    }

    /// Resume an unsaved draft handed back by the UI layer (e.g. restored
    /// client state). The draft is not registered until it is archived or a
    /// turn is accepted.
    pub fn restore_draft(&mut self, log: Vec<Message>) {
        self.active = None;
        self.draft = log;
    }

    /// Handle one user turn. Empty or whitespace-only text is a silent
    /// no-op. The first accepted turn of a fresh draft lazily creates and
    /// registers a session named per the naming policy.
    ///
    /// The generator runs before anything is mutated, so a failure leaves
    /// both the draft and the store untouched.
    pub fn submit_message(&mut self, input: &UserInput) -> Result<&[Message], GeneratorError> {
        let text = input.text().trim().to_string();
        if text.is_empty() {
            debug!("empty user input, ignoring");
            return Ok(&self.draft);
        }

        let reply = self.generator.generate(&text, self.context)?;

        if self.active.is_none() {
            let name = self.store.unique_name(&self.generated_name(&text));
            debug!(%name, "lazily creating session");
            let session = Session::new(name, self.context, self.draft.clone());
            self.active = Some(self.store.insert(session));
        }

        self.draft.push(Message::user(text));
        self.draft.push(Message::assistant(reply));
        self.write_through();

        Ok(&self.draft)
    }

    /// Archive the draft if it holds real turns, then reset to a fresh log
    /// holding a single welcome message. An active session's log is already
    /// in the store, so only the pointer resets for it.
    pub fn start_new_chat(&mut self) -> &[Message] {
        if self.active.is_none() && self.has_user_turns() {
            let name = self
                .store
                .unique_name(&timestamp_name(chrono::Local::now()));
            debug!(%name, messages = self.draft.len(), "archiving draft");
            self.store
                .insert(Session::new(name, self.context, self.draft.clone()));
        }

        self.active = None;
        self.draft = vec![Message::assistant(format!(
            "🔄 New chat started with **{}** context!",
            self.context
        ))];
        &self.draft
    }

    /// Make the session at `index` active and return a copy of its log.
    /// Out-of-range indices are a no-op returning an empty log; the index
    /// arrives from a loosely typed channel, so this is not an error.
    pub fn switch_to(&mut self, index: usize) -> Vec<Message> {
        match self.store.get(index) {
            Some(session) => {
                debug!(index, name = %session.name, "switching session");
                self.active = Some(session.id.clone());
                self.context = session.context;
                self.draft = session.log.clone();
                self.draft.clone()
            }
            None => {
                debug!(index, "switch to invalid index, ignoring");
                Vec::new()
            }
        }
    }

    /// Change a session's display name. Position and log are preserved;
    /// collisions and empty names are rejected with state unchanged.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<(), RenameError> {
        self.store.rename(index, new_name)
    }

    /// Remove the session at `index`. Deleting the active session resets
    /// the active pointer and clears the draft. Invalid indices are a
    /// no-op, idempotently.
    pub fn delete(&mut self, index: usize) -> Option<Session> {
        let removed = self.store.remove(index)?;
        debug!(index, name = %removed.name, "deleted session");
        if self.active.as_ref() == Some(&removed.id) {
            self.active = None;
            self.draft.clear();
        }
        Some(removed)
    }

    /// Select a new context. Equivalent to starting a new chat under it.
    pub fn set_context(&mut self, context: ContextKey) -> &[Message] {
        debug!(%context, "context changed");
        self.context = context;
        self.start_new_chat()
    }

    fn has_user_turns(&self) -> bool {
        self.draft
            .iter()
            .any(|m| m.role == crate::core::message::MessageRole::User)
    }

    fn generated_name(&self, first_message: &str) -> String {
        match self.naming {
            NamingPolicy::Timestamp => timestamp_name(chrono::Local::now()),
            NamingPolicy::FirstMessage => name_from_message(first_message),
        }
    }

    fn write_through(&mut self) {
        let Some(id) = self.active.clone() else {
            return;
        };
        if let Some(session) = self.store.get_by_id_mut(&id) {
            session.set_log(self.draft.clone());
        }
    }
}

fn timestamp_name(now: chrono::DateTime<chrono::Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn name_from_message(text: &str) -> String {
    let prefix: String = text.chars().take(NAME_PREFIX_LEN).collect();
    if text.chars().count() > NAME_PREFIX_LEN {
        format!("{prefix}...")
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests;
