//! Provider-agnostic text generation.
//!
//! [`LlmService`] wraps one concrete provider client chosen from the
//! [`LlmModelConfig`] and exposes a single `generate` call. Dispatch is a plain
//! enum match, without trait objects.
//!
//! # Example
//! ```no_run
//! use ai_llm_service::config::default_config::config_from_env;
//! use ai_llm_service::llm_service::{GenerationOptions, LlmService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! if let Some(cfg) = config_from_env()? {
//!     let svc = LlmService::from_config(cfg)?;
//!     let text = svc.generate("Hello", GenerationOptions::default()).await?;
//!     println!("{text}");
//! }
//! # Ok(()) }
//! ```

use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, validate_range_f32},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Per-call generation overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOptions<'a> {
    /// Optional system instruction.
    pub system: Option<&'a str>,
    /// Sampling temperature; `None` keeps the configured value.
    pub temperature: Option<f32>,
}

/// Concrete text-generation client with enum dispatch.
#[derive(Debug)]
pub enum LlmService {
    Ollama(OllamaService),
    OpenAI(OpenAiService),
}

impl LlmService {
    /// Builds the provider client selected by `cfg.provider`.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyModel`] for a blank model name
    /// - [`ConfigError::OutOfRange`] for `temperature` outside `0..=2` or
    ///   `top_p` outside `0..=1`
    /// - validation errors from the provider constructors
    pub fn from_config(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        debug!(provider = ?cfg.provider, model = %cfg.model, "initializing LLM service");
        if cfg.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        if let Some(t) = cfg.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = cfg.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        match cfg.provider {
            LlmProvider::Ollama => Ok(Self::Ollama(OllamaService::new(cfg)?)),
            LlmProvider::OpenAI => Ok(Self::OpenAI(OpenAiService::new(cfg)?)),
        }
    }

    /// Generates text for `prompt`.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the provider call fails.
    pub async fn generate(
        &self,
        prompt: &str,
        opts: GenerationOptions<'_>,
    ) -> Result<String, AiLlmError> {
        match self {
            Self::Ollama(c) => c.generate(prompt, opts).await,
            Self::OpenAI(c) => c.generate(prompt, opts).await,
        }
    }

    pub fn provider(&self) -> LlmProvider {
        match self {
            Self::Ollama(_) => LlmProvider::Ollama,
            Self::OpenAI(_) => LlmProvider::OpenAI,
        }
    }
}
