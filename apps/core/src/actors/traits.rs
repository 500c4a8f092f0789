use crate::actors::messages::{AppError, GenerationRequest, ModelStatus};
use async_trait::async_trait;

/// Defines the public interface for an LLM (Large Language Model) actor.
///
/// This trait abstracts the specific implementation of the LLM, allowing the
/// local Ollama runtime to be swapped for a mock in tests.
#[async_trait]
pub trait LlmActor: Send + Sync + 'static {
    /// Generates a complete text response for the given request.
    async fn generate(&self, request: GenerationRequest) -> Result<String, AppError>;

    /// Reports what the actor currently knows about the runtime.
    async fn status(&self) -> Result<ModelStatus, AppError>;

    /// Releases the model from memory. A no-op for backends without that notion.
    async fn unload(&self) -> Result<(), AppError> {
        Ok(())
    }
}
