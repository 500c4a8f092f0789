//! TCC inference service.
//!
//! A keyword classifier for Cognitive Behavioral Therapy (TCC) signals, a
//! response composer and an Ollama-backed model actor, served over HTTP.

pub mod actors;
pub mod brain;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod telemetry;

#[cfg(test)]
mod tests;
