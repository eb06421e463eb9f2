//! LLM config loaded strictly from environment variables.
//!
//! The palette needs a single deterministic text-generation profile. Whether it
//! exists at all decides if AI features are offered: an unset `LLM_KIND` yields
//! `Ok(None)`, any other misconfiguration is an error.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`         = provider kind (`ollama` | `openai`)
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u64, default 120)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = model (mandatory)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` = API key (mandatory)
//! - `OPENAI_MODEL`   = model (mandatory)
//! - `OPENAI_URL`     = endpoint (default `https://api.openai.com`)

use std::str::FromStr;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, opt_env, validate_http_endpoint},
};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Builds the text-generation config from the process environment.
///
/// Returns `Ok(None)` when `LLM_KIND` is unset or empty (AI unavailable).
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - [`ConfigError::MissingVar`] when a provider-specific variable is missing
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::InvalidFormat`] for bad values
pub fn config_from_env() -> Result<Option<LlmModelConfig>, AiLlmError> {
    config_from_source(&opt_env)
}

/// Same as [`config_from_env`], reading variables through `var`.
fn config_from_source(
    var: &dyn Fn(&'static str) -> Option<String>,
) -> Result<Option<LlmModelConfig>, AiLlmError> {
    let Some(kind) = var("LLM_KIND") else {
        return Ok(None);
    };
    let provider = LlmProvider::from_str(&kind)?;

    let max_tokens = parse_opt::<u32>(var, "LLM_MAX_TOKENS", "expected u32")?;
    let timeout_secs =
        parse_opt::<u64>(var, "LLM_TIMEOUT_SECS", "expected u64")?.or(Some(DEFAULT_TIMEOUT_SECS));

    let cfg = match provider {
        LlmProvider::Ollama => LlmModelConfig {
            provider,
            model: required(var, "OLLAMA_MODEL")?,
            endpoint: ollama_endpoint(var)?,
            api_key: None,
            max_tokens,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs,
        },
        LlmProvider::OpenAI => {
            let endpoint = var("OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
            validate_http_endpoint("OPENAI_URL", &endpoint)?;
            LlmModelConfig {
                provider,
                model: required(var, "OPENAI_MODEL")?,
                endpoint,
                api_key: Some(required(var, "OPENAI_API_KEY")?),
                max_tokens,
                temperature: Some(0.0),
                top_p: None,
                timeout_secs,
            }
        }
    };

    Ok(Some(cfg))
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint(var: &dyn Fn(&'static str) -> Option<String>) -> Result<String, AiLlmError> {
    if let Some(url) = var("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = var("OLLAMA_PORT") {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

fn required(
    var: &dyn Fn(&'static str) -> Option<String>,
    name: &'static str,
) -> Result<String, AiLlmError> {
    var(name).ok_or_else(|| ConfigError::MissingVar(name).into())
}

fn parse_opt<T: FromStr>(
    var: &dyn Fn(&'static str) -> Option<String>,
    name: &'static str,
    reason: &'static str,
) -> Result<Option<T>, AiLlmError> {
    match var(name) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var: name, reason }.into()),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&'static str, &str)]) -> Result<Option<LlmModelConfig>, AiLlmError> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        config_from_source(&move |name| map.get(name).cloned())
    }

    #[test]
    fn unset_kind_means_ai_unavailable() {
        assert!(load(&[]).unwrap().is_none());
    }

    #[test]
    fn ollama_from_port() {
        let cfg = load(&[
            ("LLM_KIND", "ollama"),
            ("OLLAMA_PORT", "11434"),
            ("OLLAMA_MODEL", "qwen3:14b"),
        ])
        .unwrap()
        .unwrap();
        assert_eq!(cfg.endpoint, "http://localhost:11434");
        assert_eq!(cfg.model, "qwen3:14b");
        assert_eq!(cfg.temperature, Some(0.0));
        assert_eq!(cfg.timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn openai_requires_key() {
        let err = load(&[("LLM_KIND", "openai"), ("OPENAI_MODEL", "gpt-4o-mini")]).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn openai_defaults_endpoint() {
        let cfg = load(&[
            ("LLM_KIND", "openai"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_MAX_TOKENS", "800"),
        ])
        .unwrap()
        .unwrap();
        assert_eq!(cfg.endpoint, DEFAULT_OPENAI_URL);
        assert_eq!(cfg.max_tokens, Some(800));
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = load(&[
            ("LLM_KIND", "ollama"),
            ("OLLAMA_PORT", "99999"),
            ("OLLAMA_MODEL", "m"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidNumber { var: "OLLAMA_PORT", .. })
        ));
    }
}
