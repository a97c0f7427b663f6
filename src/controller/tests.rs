use std::sync::Arc;

use super::SessionController;
use crate::core::config::NamingPolicy;
use crate::core::context::ContextKey;
use crate::core::error::{GeneratorError, RenameError};
use crate::core::message::{Message, MessageRole, UserInput};
use crate::generator::{EchoGenerator, ResponseGenerator};

fn controller(naming: NamingPolicy) -> SessionController {
    SessionController::new(Arc::new(EchoGenerator), naming, ContextKey::Science)
}

struct FailingGenerator;

impl ResponseGenerator for FailingGenerator {
    fn generate(&self, _text: &str, _context: ContextKey) -> Result<String, GeneratorError> {
        Err(GeneratorError::Failed("backend down".into()))
    }
}

#[test]
fn submit_appends_user_then_assistant() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    let log = ctl.submit_message(&"Hello".into()).unwrap();

    assert_eq!(log.len(), 2);
    assert_eq!(log[0].role, MessageRole::User);
    assert_eq!(log[0].content, "Hello");
    assert_eq!(log[1].role, MessageRole::Assistant);
    assert_eq!(
        log[1].content,
        "[Science Context] This chatbot specializes in answering science-related \
         questions. - You asked: 'Hello'"
    );
}

#[test]
fn submit_grows_log_by_two_with_alternating_roles() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    for (i, text) in ["one", "two", "three"].iter().enumerate() {
        let log = ctl.submit_message(&UserInput::Text(text.to_string())).unwrap();
        assert_eq!(log.len(), 2 * (i + 1));
    }

    let roles: Vec<_> = ctl.active_log().iter().map(|m| m.role).collect();
    for pair in roles.chunks(2) {
        assert_eq!(pair, [MessageRole::User, MessageRole::Assistant]);
    }
}

#[test]
fn empty_input_is_a_noop() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    ctl.submit_message(&"Hi".into()).unwrap();

    let before = ctl.active_log().to_vec();
    let log = ctl.submit_message(&"   \t ".into()).unwrap();
    assert_eq!(log, &before[..]);
    assert_eq!(ctl.store().len(), 1);
}

#[test]
fn first_message_lazily_registers_a_session() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    assert!(ctl.store().is_empty());
    assert!(ctl.active_session().is_none());

    ctl.submit_message(&"Hello".into()).unwrap();

    assert_eq!(ctl.store().len(), 1);
    let session = ctl.active_session().unwrap();
    // Write-through: the stored log mirrors the active draft.
    assert_eq!(session.log, ctl.active_log());
}

#[test]
fn multimodal_input_uses_its_text_field() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    let input = UserInput::Multimodal {
        text: "  read this  ".into(),
        files: vec!["notes.pdf".into()],
    };
    let log = ctl.submit_message(&input).unwrap();
    assert_eq!(log[0].content, "read this");
}

#[test]
fn first_message_naming_truncates_long_openers() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    ctl.submit_message(&"What is the speed of light in a vacuum?".into())
        .unwrap();
    assert_eq!(ctl.session_names(), vec!["What is the speed of..."]);
}

#[test]
fn first_message_naming_keeps_short_openers_whole() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    ctl.submit_message(&"Hello".into()).unwrap();
    assert_eq!(ctl.session_names(), vec!["Hello"]);
}

#[test]
fn colliding_generated_names_get_a_suffix() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    ctl.submit_message(&"Hello".into()).unwrap();
    ctl.start_new_chat();
    ctl.submit_message(&"Hello".into()).unwrap();

    assert_eq!(ctl.session_names(), vec!["Hello", "Hello (2)"]);
}

#[test]
fn start_new_chat_resets_to_a_welcome_log() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    ctl.submit_message(&"Hi".into()).unwrap();

    let fresh = ctl.start_new_chat().to_vec();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].role, MessageRole::Assistant);
    assert_eq!(
        fresh[0].content,
        "🔄 New chat started with **Science** context!"
    );
    assert!(ctl.active_session().is_none());
}

#[test]
fn start_new_chat_archives_an_unsaved_draft() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    let draft = vec![Message::user("Hi"), Message::assistant("You asked: 'Hi'")];
    ctl.restore_draft(draft.clone());

    assert!(ctl.store().is_empty());
    ctl.start_new_chat();

    assert_eq!(ctl.store().len(), 1);
    assert_eq!(ctl.store().get(0).unwrap().log, draft);
}

#[test]
fn start_new_chat_discards_a_welcome_only_draft() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    ctl.start_new_chat();
    ctl.start_new_chat();
    assert!(ctl.store().is_empty());
}

#[test]
fn archived_log_round_trips_through_switch() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    ctl.submit_message(&"Hi".into()).unwrap();
    let archived = ctl.active_log().to_vec();

    ctl.start_new_chat();
    let loaded = ctl.switch_to(0);

    assert_eq!(loaded, archived);
    assert_eq!(ctl.active_index(), Some(0));
}

#[test]
fn switch_out_of_range_returns_empty_and_changes_nothing() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    ctl.submit_message(&"A".into()).unwrap();
    ctl.start_new_chat();
    ctl.submit_message(&"B".into()).unwrap();
    let active_before = ctl.active_index();

    let loaded = ctl.switch_to(2);
    assert!(loaded.is_empty());
    assert_eq!(ctl.store().len(), 2);
    assert_eq!(ctl.active_index(), active_before);
}

#[test]
fn rename_keeps_position_and_log() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    ctl.submit_message(&"Hi".into()).unwrap();
    let log_before = ctl.store().get(0).unwrap().log.clone();

    ctl.rename(0, "X").unwrap();
    assert_eq!(ctl.session_names(), vec!["X"]);
    assert_eq!(ctl.switch_to(0), log_before);
}

#[test]
fn rename_rejects_collisions_without_mutating() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    ctl.submit_message(&"alpha".into()).unwrap();
    ctl.start_new_chat();
    ctl.submit_message(&"beta".into()).unwrap();

    let err = ctl.rename(0, "beta").unwrap_err();
    assert_eq!(err, RenameError::NameTaken("beta".into()));
    assert_eq!(ctl.session_names(), vec!["alpha", "beta"]);
}

#[test]
fn rename_rejects_empty_and_bad_index() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    ctl.submit_message(&"alpha".into()).unwrap();

    assert_eq!(ctl.rename(0, "   ").unwrap_err(), RenameError::EmptyName);
    assert_eq!(ctl.rename(5, "ok").unwrap_err(), RenameError::NotFound);
    assert_eq!(ctl.session_names(), vec!["alpha"]);
}

#[test]
fn renaming_to_the_same_name_is_allowed() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    ctl.submit_message(&"alpha".into()).unwrap();
    ctl.rename(0, "alpha").unwrap();
    assert_eq!(ctl.session_names(), vec!["alpha"]);
}

#[test]
fn delete_removes_exactly_one_and_shifts_indices() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    for text in ["a", "b", "c"] {
        ctl.submit_message(&text.into()).unwrap();
        ctl.start_new_chat();
    }
    assert_eq!(ctl.session_names(), vec!["a", "b", "c"]);

    let removed = ctl.delete(1).unwrap();
    assert_eq!(removed.name, "b");
    assert_eq!(ctl.session_names(), vec!["a", "c"]);

    // Remaining logs are intact at their shifted indices.
    let shifted = ctl.switch_to(1);
    assert!(shifted.iter().any(|m| m.content == "c"));
}

#[test]
fn delete_invalid_index_is_idempotent() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    ctl.submit_message(&"a".into()).unwrap();

    assert!(ctl.delete(7).is_none());
    assert!(ctl.delete(7).is_none());
    assert_eq!(ctl.store().len(), 1);
}

#[test]
fn deleting_the_active_session_resets_the_pointer() {
    let mut ctl = controller(NamingPolicy::FirstMessage);
    ctl.submit_message(&"a".into()).unwrap();
    assert_eq!(ctl.active_index(), Some(0));

    ctl.delete(0);
    assert!(ctl.active_session().is_none());
    assert!(ctl.active_log().is_empty());
}

#[test]
fn set_context_starts_a_new_chat() {
    let mut ctl = controller(NamingPolicy::Timestamp);
    ctl.submit_message(&"Hi".into()).unwrap();

    let fresh = ctl.set_context(ContextKey::History).to_vec();
    assert_eq!(
        fresh[0].content,
        "🔄 New chat started with **History** context!"
    );
    assert!(ctl.active_session().is_none());

    let log = ctl.submit_message(&"Who was Cleopatra?".into()).unwrap();
    assert!(log[2].content.starts_with("[History Context]"));
}

#[test]
fn generator_failure_leaves_state_untouched() {
    let mut ctl = SessionController::new(
        Arc::new(FailingGenerator),
        NamingPolicy::Timestamp,
        ContextKey::Science,
    );

    let err = ctl.submit_message(&"Hello".into()).unwrap_err();
    assert!(matches!(err, GeneratorError::Failed(_)));
    assert!(ctl.active_log().is_empty());
    assert!(ctl.store().is_empty());
}

#[test]
fn startup_welcome_names_the_context() {
    let ctl = controller(NamingPolicy::Timestamp);
    let welcome = ctl.startup_welcome();
    assert_eq!(welcome.role, MessageRole::Assistant);
    assert_eq!(
        welcome.content,
        "👋 Welcome! This chatbot is using the **Science** context."
    );
    assert!(ctl.active_log().is_empty());
}
