//! Search-as-you-type state: current text, loading flag and the visible list.
//!
//! Every text change advances a shared sequence counter. A non-empty text
//! yields a [`FetchTicket`]; only the outcome of the most recently issued
//! ticket may settle into the view, older ones are dropped as stale.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::client::PluginSearch;
use crate::errors::DirectoryResult;
use crate::fallback::default_links;
use crate::record::PluginRecord;

/// Monotonic request counter shared by a controller and its tickets.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence(Arc<AtomicU64>);

impl RequestSequence {
    fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        self.latest() == seq
    }
}

/// What the list currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// Static directory links for an empty search.
    Suggestions(Vec<PluginRecord>),
    /// Records of the last settled search. While a newer search is loading
    /// they stay visible.
    Results {
        query: String,
        records: Vec<PluginRecord>,
    },
    /// The last settled search failed.
    Failed { query: String, message: String },
}

impl ResultsView {
    pub fn records(&self) -> &[PluginRecord] {
        match self {
            ResultsView::Suggestions(r) => r,
            ResultsView::Results { records, .. } => records,
            ResultsView::Failed { .. } => &[],
        }
    }

    /// `true` for the live-results side of the palette.
    pub fn is_live(&self) -> bool {
        !matches!(self, ResultsView::Suggestions(_))
    }
}

/// Permission to run one directory fetch for `query`.
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
    query: String,
    sequence: RequestSequence,
}

/// A finished fetch, ready to be settled by the controller.
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub query: String,
    pub result: DirectoryResult<Vec<PluginRecord>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Applied,
    Stale,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// `false` once a newer text change was made.
    pub fn is_current(&self) -> bool {
        self.sequence.is_latest(self.seq)
    }

    /// Waits `coalesce`, then fetches unless the ticket was superseded meanwhile.
    ///
    /// Returns `None` when superseded; the fetcher is not called in that case.
    pub async fn run<S: PluginSearch>(self, search: &S, coalesce: Duration) -> Option<FetchOutcome> {
        if !coalesce.is_zero() {
            tokio::time::sleep(coalesce).await;
        }
        if !self.is_current() {
            debug!(seq = self.seq, query = %self.query, "ticket superseded before fetch");
            return None;
        }

        let result = search
            .search(&self.query)
            .await
            .map(|records| records.collect());

        Some(FetchOutcome {
            seq: self.seq,
            query: self.query,
            result,
        })
    }
}

/// Owned palette state.
#[derive(Debug)]
pub struct QueryController {
    search_text: String,
    sequence: RequestSequence,
    loading: bool,
    view: ResultsView,
}

impl Default for QueryController {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryController {
    pub fn new() -> Self {
        Self {
            search_text: String::new(),
            sequence: RequestSequence::default(),
            loading: false,
            view: ResultsView::Suggestions(default_links()),
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    /// Records the new text and returns a ticket when a fetch is needed.
    ///
    /// Unchanged text yields nothing. Empty text switches to the suggestions
    /// and invalidates any in-flight fetch.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> Option<FetchTicket> {
        let text = text.into();
        if text == self.search_text {
            return None;
        }

        self.search_text = text;
        let seq = self.sequence.advance();

        if self.search_text.is_empty() {
            self.loading = false;
            self.view = ResultsView::Suggestions(default_links());
            debug!(seq, "search cleared");
            return None;
        }

        self.loading = true;
        if !self.view.is_live() {
            self.view = ResultsView::Results {
                query: self.search_text.clone(),
                records: Vec::new(),
            };
        }

        debug!(seq, query = %self.search_text, "fetch ticket issued");
        Some(FetchTicket {
            seq,
            query: self.search_text.clone(),
            sequence: self.sequence.clone(),
        })
    }

    /// Applies `outcome` if it belongs to the latest ticket.
    pub fn settle(&mut self, outcome: FetchOutcome) -> Settle {
        if !self.sequence.is_latest(outcome.seq) {
            debug!(
                seq = outcome.seq,
                latest = self.sequence.latest(),
                "discarding stale outcome"
            );
            return Settle::Stale;
        }

        self.loading = false;
        self.view = match outcome.result {
            Ok(records) => ResultsView::Results {
                query: outcome.query,
                records,
            },
            Err(e) => ResultsView::Failed {
                query: outcome.query,
                message: e.to_string(),
            },
        };
        Settle::Applied
    }
}
