mod echo;

pub use echo::EchoGenerator;

use std::sync::Arc;

use crate::core::context::ContextKey;
use crate::core::error::GeneratorError;

/// Maps (trimmed user text, selected context) to a reply. Pure function of
/// its inputs, non-empty output; callers guarantee non-empty trimmed text.
/// A real model backend can substitute in without touching the surrounding
/// state machine.
pub trait ResponseGenerator: Send + Sync {
    fn generate(&self, text: &str, context: ContextKey) -> Result<String, GeneratorError>;
}

pub fn create_generator() -> Arc<dyn ResponseGenerator> {
    Arc::new(EchoGenerator)
}
