//! WordPress plugin directory search: HTTP client, payload normalization,
//! search-as-you-type state, AI summaries and the presentation model.

pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod fallback;
pub mod metrics;
pub mod normalize;
pub mod presentation;
pub mod record;
pub mod summary;

pub use client::{DirectoryClient, PluginSearch};
pub use config::DirectoryConfig;
pub use controller::{FetchOutcome, FetchTicket, QueryController, ResultsView, Settle};
pub use errors::{DirectoryConfigError, DirectoryError, DirectoryResult, SummaryError};
pub use normalize::{DescriptionMode, PluginRecords, normalize_response};
pub use record::{BuiltinIcon, IconRef, PluginRecord, Ratio};
pub use summary::{Summary, SummaryRequester, SummaryState, TextGenerator};
