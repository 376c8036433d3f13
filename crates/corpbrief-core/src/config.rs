//! Environment-backed configuration.
//!
//! The CLI surface has no flags and no configuration file, so everything is
//! resolved from the process environment at startup. API keys stay wrapped in
//! [`SecretValue`] to reduce accidental logging.

use std::env;
use std::path::PathBuf;

use crate::error::CorpbriefError;

const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
const TAVILY_KEY_ENV: &str = "TAVILY_API_KEY";
const MODEL_ENV: &str = "OPENAI_MODEL";
const TEMPERATURE_ENV: &str = "OPENAI_TEMPERATURE";
const OUTPUT_DIR_ENV: &str = "CORPBRIEF_OUTPUT_DIR";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Wrapper around sensitive values so `Debug` output stays redacted.
#[derive(Clone)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***redacted***")
    }
}

/// Require that an environment variable is set and non-empty.
pub fn require_env(var: &str) -> Result<SecretValue, CorpbriefError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretValue(value)),
        _ => Err(CorpbriefError::MissingSecret(var.to_string())),
    }
}

/// Settings for the chat-completion service.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub api_key: SecretValue,
}

/// Settings for the web-search service.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub api_key: SecretValue,
}

/// Top-level runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub output_dir: PathBuf,
}

impl Config {
    /// Resolve the full configuration from the process environment.
    pub fn from_env() -> Result<Self, CorpbriefError> {
        let llm_api_key = require_env(OPENAI_KEY_ENV)?;
        let search_api_key = require_env(TAVILY_KEY_ENV)?;

        let model = env::var(MODEL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = match env::var(TEMPERATURE_ENV) {
            Ok(raw) => raw.trim().parse::<f32>().map_err(|_| {
                CorpbriefError::InvalidConfiguration(format!(
                    "{TEMPERATURE_ENV} must be a number, got {raw:?}"
                ))
            })?,
            Err(_) => DEFAULT_TEMPERATURE,
        };

        let output_dir = env::var(OUTPUT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Ok(Self {
            llm: LlmSettings {
                model,
                temperature,
                api_key: llm_api_key,
            },
            search: SearchSettings {
                api_key: search_api_key,
            },
            output_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SecretValue("sk-very-secret".to_string());
        assert_eq!(format!("{secret:?}"), "***redacted***");
        assert_eq!(secret.expose(), "sk-very-secret");
    }

    #[test]
    fn require_env_rejects_missing_and_blank() {
        unsafe {
            env::remove_var("CORPBRIEF_TEST_ABSENT");
        }
        let err = require_env("CORPBRIEF_TEST_ABSENT").unwrap_err();
        assert!(matches!(err, CorpbriefError::MissingSecret(_)));

        unsafe {
            env::set_var("CORPBRIEF_TEST_BLANK", "   ");
        }
        let err = require_env("CORPBRIEF_TEST_BLANK").unwrap_err();
        assert!(matches!(err, CorpbriefError::MissingSecret(_)));
        unsafe {
            env::remove_var("CORPBRIEF_TEST_BLANK");
        }
    }

    #[test]
    fn require_env_returns_value() {
        unsafe {
            env::set_var("CORPBRIEF_TEST_PRESENT", "value");
        }
        let secret = require_env("CORPBRIEF_TEST_PRESENT").expect("secret should load");
        assert_eq!(secret.expose(), "value");
        unsafe {
            env::remove_var("CORPBRIEF_TEST_PRESENT");
        }
    }
}
