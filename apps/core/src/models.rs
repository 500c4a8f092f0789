use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Maximum prompt length in characters.
pub const MAX_PROMPT_CHARS: usize = 10_000;

/// Body of a `POST /inference` request.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct InferenceRequest {
    /// The client's free-text message.
    #[validate(length(max = 10000, message = "Prompt too long (max 10KB)"))]
    pub prompt: String,
    /// Upper bound on generated tokens. Falls back to the configured default.
    #[validate(range(min = 1, max = 2048, message = "max_tokens must be between 1 and 2048"))]
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature. Value between 0.0 and 2.0.
    #[validate(range(min = 0.0, max = 2.0, message = "temperature must be between 0 and 2"))]
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Parses and validates a raw JSON body.
    pub fn from_json(body: &[u8]) -> Result<Self, AppError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(AppError::Validation(
                "Request body must be a JSON object".to_string(),
            ));
        }
        match value.get("prompt") {
            None => {
                return Err(AppError::Validation(
                    "Missing required field: prompt".to_string(),
                ))
            }
            Some(prompt) if !prompt.is_string() => {
                return Err(AppError::Validation(
                    "Prompt must be a non-empty string".to_string(),
                ))
            }
            Some(_) => {}
        }

        let request: InferenceRequest = serde_json::from_value(value)?;
        request.check()?;
        Ok(request)
    }

    /// Runs field validation, reporting the first failing rule.
    pub fn check(&self) -> Result<(), AppError> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::Validation(
                "Prompt must be a non-empty string".to_string(),
            ));
        }

        self.validate().map_err(|errors| {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .next();
            match message {
                Some(message) => AppError::Validation(message),
                None => AppError::from(errors),
            }
        })
    }
}

/// Strips markup-like characters and bounds the prompt length.
pub fn sanitize_prompt(prompt: &str) -> String {
    let sanitized: String = prompt
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .take(MAX_PROMPT_CHARS)
        .collect();
    sanitized.trim().to_string()
}
