//! Response composition.
//!
//! Turns a [`Classification`] and an optional model [`Generation`] into the
//! response record. With a generation the model text is used as-is (live
//! mode); without one a canned template stands in for it (demo mode).

use chrono::Utc;
use rand::Rng;
use std::ops::Range;

use super::analysis::{push_unique, Classification, Generation, TccResponse};
use super::templates::response_template;

pub const DEFAULT_HOMEWORK_CAP: usize = 3;

/// Placeholder latency range reported in demo mode, in seconds
const DEMO_LATENCY: Range<f64> = 0.5..2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    pub model_name: String,
    pub homework_cap: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            model_name: "llama2:7b".to_string(),
            homework_cap: DEFAULT_HOMEWORK_CAP,
        }
    }
}

pub struct ResponseComposer {
    config: ComposerConfig,
}

impl ResponseComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    /// Build the response record. `generation` is `None` when the model was unavailable.
    pub fn compose(
        &self,
        classification: &Classification,
        generation: Option<Generation>,
    ) -> TccResponse {
        let demo_mode = generation.is_none();

        let (response, inference_time, model) = match generation {
            Some(generation) => (
                generation.text,
                round_secs(generation.elapsed.as_secs_f64()),
                self.config.model_name.clone(),
            ),
            None => (
                response_template(classification.category).to_string(),
                round_secs(rand::thread_rng().gen_range(DEMO_LATENCY)),
                format!("{} (TCC demo mode)", self.config.model_name),
            ),
        };

        TccResponse {
            tokens_generated: word_count(&response),
            response,
            inference_time,
            model,
            tcc_analysis: classification.analysis.clone(),
            homework_suggestions: self.homework(classification),
            category: classification.category,
            demo_mode,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Homework of every matched category, deduplicated and capped
    pub fn homework(&self, classification: &Classification) -> Vec<String> {
        let mut homework = Vec::new();
        for category in classification.homework_categories() {
            for item in category.homework() {
                if homework.len() >= self.config.homework_cap {
                    return homework;
                }
                push_unique(&mut homework, item);
            }
        }
        homework
    }
}

/// Approximate token count: whitespace-delimited words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn round_secs(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
