//! Environment-driven configuration.
//!
//! Everything the service needs is read once at startup into [`AppConfig`] and
//! then handed to each component as an explicit struct.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;
use url::Url;
use validator::Validate;

use crate::brain::{ClassifierConfig, ComposerConfig, MatchMode};
use crate::error::AppError;
use crate::telemetry::LogFormat;

pub const DEFAULT_MODEL_NAME: &str = "llama2:7b";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Variables that should be set explicitly in production.
const REQUIRED_VARS: &[&str] = &["MODEL_NAME"];

/// Connection settings for the Ollama runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Base URL without trailing slash.
    pub server_url: String,
    pub model_name: String,
    pub auth_token: Option<String>,
    /// Spawn `ollama serve` when the runtime is not reachable at startup.
    pub autostart: bool,
}

#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    #[validate(length(min = 1))]
    pub model_name: String,
    #[validate(range(min = 1, max = 2048))]
    pub max_tokens: u32,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
    /// Seconds. Reported in status only.
    pub cache_ttl: u64,
    pub ollama_url: Url,
    pub ollama_auth_token: Option<String>,
    pub ollama_autostart: bool,
    /// Skip the model entirely and answer from templates.
    pub demo_mode: bool,
    pub match_mode: MatchMode,
    pub homework_cap: usize,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            max_tokens: 512,
            temperature: 0.7,
            cache_ttl: 3600,
            ollama_url: Url::parse(DEFAULT_OLLAMA_URL).expect("Invalid default Ollama URL"),
            ollama_auth_token: None,
            ollama_autostart: false,
            demo_mode: false,
            match_mode: MatchMode::Substring,
            homework_cap: crate::brain::composer::DEFAULT_HOMEWORK_CAP,
            port: 8080,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_vars()
    }

    /// Reads the process environment only.
    pub fn from_vars() -> Result<Self, AppError> {
        let defaults = Self::default();

        let ollama_url = match non_empty_var("OLLAMA_URL") {
            Some(raw) => Url::parse(&raw)?,
            None => defaults.ollama_url,
        };

        let config = Self {
            model_name: non_empty_var("MODEL_NAME").unwrap_or(defaults.model_name),
            max_tokens: parse_var("MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_var("TEMPERATURE", defaults.temperature)?,
            cache_ttl: parse_var("CACHE_TTL", defaults.cache_ttl)?,
            ollama_url,
            ollama_auth_token: non_empty_var("OLLAMA_AUTH_TOKEN"),
            ollama_autostart: flag_var("OLLAMA_AUTOSTART")?,
            demo_mode: flag_var("DEMO_MODE")?,
            match_mode: parse_var("MATCH_MODE", defaults.match_mode)?,
            homework_cap: parse_var("HOMEWORK_CAP", defaults.homework_cap)?,
            port: parse_var("PORT", defaults.port)?,
            log_format: parse_var("LOG_FORMAT", defaults.log_format)?,
        };

        config
            .validate()
            .map_err(|e| AppError::Config(format!("Invalid configuration: {}", e)))?;
        Ok(config)
    }

    /// Required variables that are missing from the environment.
    pub fn missing_vars() -> Vec<&'static str> {
        REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| non_empty_var(key).is_none())
            .collect()
    }

    /// Logs a warning for every missing required variable.
    pub fn warn_missing(&self) {
        for key in Self::missing_vars() {
            warn!("{} is not set, using default '{}'", key, self.model_name);
        }
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            match_mode: self.match_mode,
        }
    }

    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            model_name: self.model_name.clone(),
            homework_cap: self.homework_cap,
        }
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            server_url: self.ollama_url.as_str().trim_end_matches('/').to_string(),
            model_name: self.model_name.clone(),
            auth_token: self.ollama_auth_token.clone(),
            autostart: self.ollama_autostart,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

fn flag_var(key: &str) -> Result<bool, AppError> {
    match non_empty_var(key).map(|v| v.to_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "off") => Ok(false),
        Some(v) => Err(AppError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, v
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: &[&str] = &[
        "MODEL_NAME",
        "MAX_TOKENS",
        "TEMPERATURE",
        "CACHE_TTL",
        "OLLAMA_URL",
        "OLLAMA_AUTH_TOKEN",
        "OLLAMA_AUTOSTART",
        "DEMO_MODE",
        "MATCH_MODE",
        "HOMEWORK_CAP",
        "PORT",
        "LOG_FORMAT",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let mut all: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|k| (*k, None)).collect();
        for &(key, value) in vars {
            all.retain(|(k, _)| *k != key);
            all.push((key, Some(value)));
        }
        temp_env::with_vars(all, f);
    }

    #[test]
    fn test_defaults() {
        with_env(&[], || {
            let config = AppConfig::from_vars().unwrap();
            assert_eq!(config.model_name, DEFAULT_MODEL_NAME);
            assert_eq!(config.max_tokens, 512);
            assert_eq!(config.temperature, 0.7);
            assert_eq!(config.cache_ttl, 3600);
            assert_eq!(config.port, 8080);
            assert!(!config.demo_mode);
            assert_eq!(config.match_mode, MatchMode::Substring);
            assert_eq!(config.llm_config().server_url, DEFAULT_OLLAMA_URL);
            assert_eq!(AppConfig::missing_vars(), vec!["MODEL_NAME"]);
        });
    }

    #[test]
    fn test_overrides() {
        with_env(
            &[
                ("MODEL_NAME", "phi3:mini"),
                ("MAX_TOKENS", "256"),
                ("TEMPERATURE", "0.2"),
                ("OLLAMA_URL", "http://ollama:11434/"),
                ("DEMO_MODE", "true"),
                ("MATCH_MODE", "whole_word"),
                ("HOMEWORK_CAP", "5"),
                ("LOG_FORMAT", "json"),
            ],
            || {
                let config = AppConfig::from_vars().unwrap();
                assert_eq!(config.model_name, "phi3:mini");
                assert_eq!(config.max_tokens, 256);
                assert!(config.demo_mode);
                assert_eq!(config.match_mode, MatchMode::WordPrefix);
                assert_eq!(config.log_format, LogFormat::Json);
                assert_eq!(config.composer_config().homework_cap, 5);
                assert_eq!(config.llm_config().server_url, "http://ollama:11434");
                assert!(AppConfig::missing_vars().is_empty());
            },
        );
    }

    #[test]
    fn test_invalid_number() {
        with_env(&[("MAX_TOKENS", "lots")], || {
            let err = AppConfig::from_vars().unwrap_err();
            assert!(matches!(err, AppError::Config(ref m) if m.contains("MAX_TOKENS")));
        });
    }

    #[test]
    fn test_out_of_range_temperature() {
        with_env(&[("TEMPERATURE", "3.5")], || {
            assert!(matches!(AppConfig::from_vars(), Err(AppError::Config(_))));
        });
    }

    #[test]
    fn test_invalid_url() {
        with_env(&[("OLLAMA_URL", "not a url")], || {
            assert!(matches!(AppConfig::from_vars(), Err(AppError::Config(_))));
        });
    }

    #[test]
    fn test_invalid_flag() {
        with_env(&[("DEMO_MODE", "maybe")], || {
            assert!(matches!(AppConfig::from_vars(), Err(AppError::Config(_))));
        });
    }
}
