//! AI documentation summary for a single plugin.
//!
//! A [`SummaryRequester`] is single-shot:
//! `Idle → Requesting → Rendered | Failed`. There is no retry and no
//! cancellation once the request is issued.

use std::future::Future;

use ai_llm_service::{AiLlmError, GenerationOptions, LlmService};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::errors::SummaryError;
use crate::record::PluginRecord;

/// Sampling temperature for summaries: no creativity.
pub const SUMMARY_TEMPERATURE: f32 = 0.0;

const PROMPT_PREAMBLE: &str = "Summarize the following from the WordPress documentation and \
give one example of usage in a code block. Add the language to the code block like ```php. \
The context can only be about WordPress. Format the response as if you are providing \
documentation:\n";

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"```[\w\S]*\n([\s\S]*?)\n```").unwrap();
    static ref TRIPLE_BACKTICK: Regex = Regex::new(r"`{3}").unwrap();
}

/// Text-generation capability used for summaries.
pub trait TextGenerator {
    fn complete(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send;
}

impl TextGenerator for LlmService {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AiLlmError> {
        let opts = GenerationOptions {
            system: None,
            temperature: Some(temperature),
        };
        self.generate(prompt, opts).await
    }
}

impl<T: TextGenerator> TextGenerator for &T {
    fn complete(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send {
        (**self).complete(prompt, temperature)
    }
}

/// Embeds the JSON form of `record` in the documentation instruction.
pub fn build_prompt(record: &PluginRecord) -> Result<String, serde_json::Error> {
    let item = serde_json::to_string(record)?;
    Ok(format!("{PROMPT_PREAMBLE}{item}"))
}

/// Body of the first fenced code block, language tag ignored, with any
/// leftover triple backticks removed.
pub fn extract_snippet(text: &str) -> Option<String> {
    let body = CODE_FENCE.captures(text)?.get(1)?.as_str();
    let cleaned = TRIPLE_BACKTICK.replace_all(body, "").into_owned();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// A rendered summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub markdown: String,
    /// First code example, if the model produced one.
    pub snippet: Option<String>,
}

impl Summary {
    pub fn from_text(markdown: String) -> Self {
        let snippet = extract_snippet(&markdown);
        Self { markdown, snippet }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    Idle,
    Requesting,
    Rendered(Summary),
    Failed(String),
}

pub struct SummaryRequester<G> {
    generator: G,
    record: PluginRecord,
    prompt: String,
    state: SummaryState,
}

impl<G: TextGenerator> SummaryRequester<G> {
    /// Prepares the prompt for `record`; nothing is sent yet.
    pub fn new(generator: G, record: PluginRecord) -> Result<Self, serde_json::Error> {
        let prompt = build_prompt(&record)?;
        Ok(Self {
            generator,
            record,
            prompt,
            state: SummaryState::Idle,
        })
    }

    pub fn record(&self) -> &PluginRecord {
        &self.record
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    /// Issues the one and only generation call and runs it to completion.
    ///
    /// # Errors
    /// - [`SummaryError::AlreadyIssued`] if called after leaving `Idle`
    /// - [`SummaryError::Generation`] if the provider call fails; the state
    ///   becomes `Failed`
    pub async fn request(&mut self) -> Result<Summary, SummaryError> {
        if self.state != SummaryState::Idle {
            return Err(SummaryError::AlreadyIssued);
        }

        self.state = SummaryState::Requesting;
        info!(plugin = %self.record.name, prompt_len = self.prompt.len(), "requesting summary");

        match self
            .generator
            .complete(&self.prompt, SUMMARY_TEMPERATURE)
            .await
        {
            Ok(text) => {
                let summary = Summary::from_text(text);
                info!(
                    plugin = %self.record.name,
                    has_snippet = summary.snippet.is_some(),
                    "summary rendered"
                );
                self.state = SummaryState::Rendered(summary.clone());
                Ok(summary)
            }
            Err(e) => {
                warn!(plugin = %self.record.name, error = %e, "summary request failed");
                self.state = SummaryState::Failed(e.to_string());
                Err(SummaryError::Generation(e))
            }
        }
    }

    /// Markdown body for the summary view in the current state.
    pub fn markdown(&self) -> String {
        match &self.state {
            SummaryState::Idle | SummaryState::Requesting => String::new(),
            SummaryState::Rendered(s) => s.markdown.clone(),
            SummaryState::Failed(msg) => format!("**Summary failed**\n\n{msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};

    use super::*;
    use crate::record::{IconRef, Ratio};

    struct FakeGenerator {
        reply: Result<String, ()>,
        seen: Mutex<Vec<(String, f32)>>,
    }

    impl FakeGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AiLlmError> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(ProviderError::new(
                    Provider::Ollama,
                    ProviderErrorKind::EmptyChoices,
                )
                .into()),
            }
        }
    }

    fn akismet() -> PluginRecord {
        let mut r = PluginRecord::link(
            "Akismet",
            "Spam protection",
            "https://wordpress.org/plugins/akismet/",
            IconRef::Remote("https://ps.w.org/akismet/icon.png".into()),
        );
        r.version = Some("5.3".into());
        r.rating = Ratio::Percent(10);
        r
    }

    #[test]
    fn extracts_first_fenced_block_without_backticks() {
        let text = "Intro\n```php\n<?php echo 1; ?>\n```\nmore\n```js\nalert(1)\n```";
        assert_eq!(extract_snippet(text).as_deref(), Some("<?php echo 1; ?>"));
    }

    #[test]
    fn multi_line_snippet_is_kept_whole() {
        let text = "```php\nadd_action( 'init', 'x' );\nfunction x() {}\n```";
        assert_eq!(
            extract_snippet(text).as_deref(),
            Some("add_action( 'init', 'x' );\nfunction x() {}")
        );
    }

    #[test]
    fn no_fence_means_no_snippet() {
        assert_eq!(extract_snippet("just prose"), None);
        assert_eq!(extract_snippet("```php\n```"), None);
    }

    #[test]
    fn prompt_embeds_record_json() {
        let prompt = build_prompt(&akismet()).unwrap();
        assert!(prompt.starts_with("Summarize the following from the WordPress documentation"));
        assert!(prompt.contains("like ```php."));
        assert!(prompt.ends_with(&serde_json::to_string(&akismet()).unwrap()));
        assert!(prompt.contains(r#""url":"https://wordpress.org/plugins/akismet/""#));
    }

    #[tokio::test]
    async fn renders_with_zero_temperature() {
        let generator = FakeGenerator::replying("# Akismet\n```php\n<?php akismet(); ?>\n```");
        let mut req = SummaryRequester::new(&generator, akismet()).unwrap();
        assert_eq!(req.state(), &SummaryState::Idle);

        let summary = req.request().await.unwrap();
        assert_eq!(summary.snippet.as_deref(), Some("<?php akismet(); ?>"));
        assert!(matches!(req.state(), SummaryState::Rendered(_)));
        assert_eq!(req.markdown(), summary.markdown);

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, SUMMARY_TEMPERATURE);
        assert_eq!(seen[0].0, req.prompt());
    }

    #[tokio::test]
    async fn failure_is_terminal_and_single_shot() {
        let generator = FakeGenerator::failing();
        let mut req = SummaryRequester::new(&generator, akismet()).unwrap();

        assert!(matches!(req.request().await, Err(SummaryError::Generation(_))));
        assert!(matches!(req.state(), SummaryState::Failed(_)));
        assert!(req.markdown().starts_with("**Summary failed**"));

        assert!(matches!(req.request().await, Err(SummaryError::AlreadyIssued)));
        assert_eq!(generator.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rendered_requester_refuses_a_second_call() {
        let generator = FakeGenerator::replying("ok");
        let mut req = SummaryRequester::new(&generator, akismet()).unwrap();
        let summary = req.request().await.unwrap();
        assert_eq!(summary.snippet, None);
        assert!(matches!(req.request().await, Err(SummaryError::AlreadyIssued)));
    }

    #[test]
    fn idle_requester_renders_nothing() {
        let generator = FakeGenerator::replying("ok");
        let req = SummaryRequester::new(&generator, akismet()).unwrap();
        assert_eq!(req.state(), &SummaryState::Idle);
        assert_eq!(req.markdown(), "");
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn llm_service_summaries_override_configured_temperature() {
        use ai_llm_service::{LlmModelConfig, LlmProvider};
        use mockito::Matcher;
        use serde_json::json;

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3",
                "stream": false,
                "options": { "temperature": 0.0 }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"Akismet\n```php\nakismet();\n```"}"#)
            .create_async()
            .await;

        let llm = LlmService::from_config(LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".into(),
            endpoint: server.url(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(5),
        })
        .unwrap();

        let mut req = SummaryRequester::new(&llm, akismet()).unwrap();
        let summary = req.request().await.unwrap();

        mock.assert_async().await;
        assert_eq!(summary.snippet.as_deref(), Some("akismet();"));
    }
}
