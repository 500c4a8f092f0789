use crate::actors::messages::{AppError, GenerationRequest, ModelStatus};
use crate::actors::traits::LlmActor;
use crate::brain::templates::{build_tcc_prompt, SYSTEM_PROMPT};
use crate::brain::{Generation, ResponseComposer, TccClassifier, TccResponse};
use crate::config::AppConfig;
use crate::models::{sanitize_prompt, InferenceRequest};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

const WARMUP_PROMPT: &str = "Hello";
const WARMUP_MAX_TOKENS: u32 = 10;
const WARMUP_TEMPERATURE: f32 = 0.1;

/// Request defaults and mode switches for the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Never call the model; always answer from templates.
    pub demo_mode: bool,
    pub cache_ttl: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
            demo_mode: false,
            cache_ttl: 3600,
        }
    }
}

impl From<&AppConfig> for SupervisorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            demo_mode: config.demo_mode,
            cache_ttl: config.cache_ttl,
        }
    }
}

/// Model status enriched with the service-level mode flags.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorStatus {
    #[serde(flatten)]
    pub model: ModelStatus,
    /// Forced, or the mode the most recent request ended up in.
    pub demo_mode: bool,
    pub cache_ttl: u64,
    pub tcc_enabled: bool,
}

/// Entry point for all business logic.
///
/// Runs every request through sanitize, classify, generate and compose. The
/// model is optional: when it fails the request is answered in demo mode.
pub struct TherapySupervisor<L: LlmActor + ?Sized> {
    classifier: TccClassifier,
    composer: ResponseComposer,
    llm_actor: Arc<L>,
    config: SupervisorConfig,
    last_demo: AtomicBool,
}

impl<L: LlmActor + ?Sized> TherapySupervisor<L> {
    pub fn new(
        classifier: TccClassifier,
        composer: ResponseComposer,
        llm_actor: Arc<L>,
        config: SupervisorConfig,
    ) -> Self {
        let last_demo = AtomicBool::new(config.demo_mode);
        Self {
            classifier,
            composer,
            llm_actor,
            config,
            last_demo,
        }
    }

    /// Builds every component from the application configuration.
    pub fn from_config(config: &AppConfig, llm_actor: Arc<L>) -> Self {
        Self::new(
            TccClassifier::new(config.classifier_config()),
            ResponseComposer::new(config.composer_config()),
            llm_actor,
            SupervisorConfig::from(config),
        )
    }

    pub fn model_name(&self) -> &str {
        self.composer.model_name()
    }

    pub fn llm_actor(&self) -> &Arc<L> {
        &self.llm_actor
    }

    /// Processes a single client message.
    ///
    /// Fails only on invalid input. Model errors degrade to demo mode.
    #[instrument(skip(self, request), fields(prompt_len = request.prompt.len()))]
    pub async fn infer(&self, request: InferenceRequest) -> Result<TccResponse, AppError> {
        request.check()?;

        // May be empty once markup is stripped; that classifies as general.
        let prompt = sanitize_prompt(&request.prompt);

        let classification = self.classifier.classify(&prompt);
        info!(
            category = %classification.category,
            matched = classification.matched_categories.len(),
            "Classified client input"
        );

        let generation = if self.config.demo_mode {
            None
        } else {
            let generation_request = GenerationRequest {
                prompt: build_tcc_prompt(&prompt, &classification.analysis),
                system_prompt: Some(SYSTEM_PROMPT.to_string()),
                max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
                temperature: request.temperature.unwrap_or(self.config.temperature),
            };

            let started = Instant::now();
            match self.llm_actor.generate(generation_request).await {
                Ok(text) => Some(Generation {
                    text,
                    elapsed: started.elapsed(),
                }),
                Err(e) => {
                    warn!("Model unavailable, answering in demo mode: {}", e);
                    None
                }
            }
        };

        self.last_demo.store(generation.is_none(), Ordering::Relaxed);

        let response = self.composer.compose(&classification, generation);
        info!(
            demo_mode = response.demo_mode,
            tokens = response.tokens_generated,
            "Response composed"
        );
        Ok(response)
    }

    pub async fn status(&self) -> Result<SupervisorStatus, AppError> {
        let model = self.llm_actor.status().await?;
        Ok(SupervisorStatus {
            model,
            demo_mode: self.config.demo_mode || self.last_demo.load(Ordering::Relaxed),
            cache_ttl: self.config.cache_ttl,
            tcc_enabled: true,
        })
    }

    /// Sends a tiny generation so the first real request does not pay for model load.
    pub async fn warmup(&self) {
        if self.config.demo_mode {
            info!("Demo mode: skipping model warmup");
            return;
        }

        info!("Warming up model...");
        let request = GenerationRequest {
            prompt: WARMUP_PROMPT.to_string(),
            system_prompt: None,
            max_tokens: WARMUP_MAX_TOKENS,
            temperature: WARMUP_TEMPERATURE,
        };
        match self.llm_actor.generate(request).await {
            Ok(_) => {
                self.last_demo.store(false, Ordering::Relaxed);
                info!("Model warmup completed");
            }
            Err(e) => {
                self.last_demo.store(true, Ordering::Relaxed);
                error!("Warmup error: {}", e);
            }
        }
    }

    /// Releases the model on shutdown.
    pub async fn shutdown(&self) {
        if let Err(e) = self.llm_actor.unload().await {
            error!("Error unloading model: {}", e);
        }
    }
}
