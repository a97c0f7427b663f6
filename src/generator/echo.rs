use crate::core::context::ContextKey;
use crate::core::error::GeneratorError;
use crate::generator::ResponseGenerator;

/// Stub backend standing in for any real NLP/RAG pipeline: echoes the user's
/// text behind the canned per-context description.
pub struct EchoGenerator;

impl ResponseGenerator for EchoGenerator {
    fn generate(&self, text: &str, context: ContextKey) -> Result<String, GeneratorError> {
        let reply = format!(
            "[{context} Context] {} - You asked: '{text}'",
            context.description()
        );
        if reply.trim().is_empty() {
            return Err(GeneratorError::EmptyReply);
        }
        Ok(reply)
    }
}
