//! Test Module
//!
//! Cross-module test suite for the TCC inference service.
//!
//! ## Test Categories
//! - `brain_tests`: Classification and composition scenarios
//! - `actor_tests`: Supervisor orchestration over a mock LLM actor
//! - `routes_tests`: HTTP surface, status codes and error bodies
