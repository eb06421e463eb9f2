//! HTTP client for the plugin directory search endpoint.
//!
//! Endpoint used:
//!   * GET {api_url}?action=query_plugins&request[per_page]={n}&request[search]={text}

use std::future::Future;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::DirectoryConfig;
use crate::errors::DirectoryResult;
use crate::normalize::{DescriptionMode, PluginRecords, normalize_response};

/// Anything that can answer a directory search.
pub trait PluginSearch {
    fn search(&self, query: &str) -> impl Future<Output = DirectoryResult<PluginRecords>> + Send;
}

/// Directory HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: Client,
    api_url: String,
    per_page: u32,
    mode: DescriptionMode,
}

impl DirectoryClient {
    /// Builds a client with the configured timeout and a stable user agent.
    pub fn new(cfg: &DirectoryConfig) -> DirectoryResult<Self> {
        debug!(api_url = %cfg.api_url, per_page = cfg.per_page, "creating DirectoryClient");

        let http = Client::builder()
            .user_agent(concat!("wp-plugin-palette/", env!("CARGO_PKG_VERSION")))
            .timeout(cfg.timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            api_url: cfg.api_url.clone(),
            per_page: cfg.per_page,
            mode: cfg.description_mode,
        })
    }

    /// Full request URL for `query`; the text is percent-encoded.
    pub fn search_url(&self, query: &str) -> String {
        let sep = if self.api_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}action=query_plugins&request[per_page]={}&request[search]={}",
            self.api_url,
            sep,
            self.per_page,
            urlencoding::encode(query)
        )
    }
}

impl PluginSearch for DirectoryClient {
    /// Fetches one page of results and normalizes it.
    ///
    /// Transport failures map to `Timeout`/`Transport`; status and payload
    /// problems are reported by [`normalize_response`].
    #[instrument(skip(self), fields(per_page = self.per_page))]
    async fn search(&self, query: &str) -> DirectoryResult<PluginRecords> {
        let url = self.search_url(query);
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        debug!(%status, bytes = body.len(), "directory responded");
        normalize_response(status, &body, self.mode)
    }
}
