//! Text generation over Ollama and OpenAI with unified errors and
//! environment-driven configuration.

pub mod config;
pub mod error_handler;
pub mod llm_service;
pub mod services;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use llm_service::{GenerationOptions, LlmService};
