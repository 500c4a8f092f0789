use serde::Serialize;
use tokio::sync::oneshot;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// An error originating from the LLM runtime.
    #[error("LLM request failed: {0}")]
    LlmError(String),
    /// A generic internal error within an actor.
    #[error("Internal system error: {0}")]
    Internal(String),
    /// An error indicating that an actor operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for ActorError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ActorError::Timeout(format!("Actor operation timed out: {}", err))
    }
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Parameters of a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Snapshot of the model runtime as seen by the LLM actor.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    /// Whether the configured model is known to be present in the runtime.
    pub loaded: bool,
    pub model_name: String,
    pub server_url: String,
    /// Result of the most recent request or health check against the runtime.
    pub reachable: bool,
    /// Unix seconds of the last successful generation, 0 if none.
    pub last_activity: i64,
}

/// Messages that can be sent to the `LlmActor`.
#[derive(Debug)]
pub enum LlmMessage {
    /// A request to generate a complete text response.
    Generate {
        request: GenerationRequest,
        /// A channel to send the final `String` result back.
        responder: oneshot::Sender<Result<String, AppError>>,
    },
    /// A request to release the model from the runtime's memory.
    Unload {
        responder: oneshot::Sender<Result<(), AppError>>,
    },
}
