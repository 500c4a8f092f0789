//! # Brain Module
//!
//! Fast, non-LLM TCC analysis for client input.
//! Runs on every request, whether or not the model answers.
//!
//! ## Components
//! - `rules`: Static, ordered CBT rule table
//! - `classifier`: Maps text to categories and CBT signals
//! - `analysis`: Analysis and response records
//! - `templates`: System prompt, prompt builder, canned responses
//! - `composer`: Builds the response record in live or demo mode

pub mod analysis;
pub mod classifier;
pub mod composer;
pub mod rules;
pub mod templates;

pub use analysis::{Classification, Generation, TccAnalysis, TccResponse};
pub use classifier::{ClassifierConfig, MatchMode, TccClassifier};
pub use composer::{ComposerConfig, ResponseComposer};
pub use rules::Category;
