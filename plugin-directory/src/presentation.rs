//! Host-agnostic description of what the palette shows: list sections, the
//! per-item detail pane and the action panels.
//!
//! Nothing here performs side effects; front-ends execute [`ListAction`]s.

use std::fmt;

use crate::controller::ResultsView;
use crate::record::PluginRecord;
use crate::summary::Summary;

pub const SEARCH_PLACEHOLDER: &str = "Search WordPress plugins...";
pub const SECTION_TITLE: &str = "Results";
pub const SUMMARY_TITLE: &str = "AI Generated Summary";

const UNKNOWN: &str = "unknown";
const DOWNLOAD_TEXT: &str = "Download from WordPress.org";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataEntry {
    Link {
        title: &'static str,
        target: String,
        text: &'static str,
    },
    Label {
        title: &'static str,
        text: String,
    },
}

impl MetadataEntry {
    pub fn title(&self) -> &'static str {
        match self {
            MetadataEntry::Link { title, .. } | MetadataEntry::Label { title, .. } => *title,
        }
    }

    fn label(title: &'static str, text: Option<&str>) -> Self {
        MetadataEntry::Label {
            title,
            text: text.unwrap_or(UNKNOWN).to_string(),
        }
    }
}

/// Right-hand detail pane of a live result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub markdown: String,
    pub metadata: Vec<MetadataEntry>,
}

impl DetailView {
    pub fn for_record(record: &PluginRecord) -> Self {
        let metadata = vec![
            MetadataEntry::Link {
                title: "Download Zip",
                target: record.download.clone().unwrap_or_else(|| "#".to_string()),
                text: DOWNLOAD_TEXT,
            },
            MetadataEntry::label("Version", record.version.as_deref()),
            MetadataEntry::Label {
                title: "1 Star ratio",
                text: record.rating.to_string(),
            },
            MetadataEntry::Label {
                title: "Problem-solving ratio",
                text: record.solved.to_string(),
            },
            MetadataEntry::label("Downloaded", record.downloaded.as_deref()),
            MetadataEntry::label("Last Updated", record.last_updated.as_deref()),
        ];

        Self {
            markdown: record.description.clone(),
            metadata,
        }
    }
}

/// Keyboard shortcuts bound to actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    CmdShiftEnter,
    CmdShiftC,
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortcut::CmdShiftEnter => f.write_str("⌘⇧↵"),
            Shortcut::CmdShiftC => f.write_str("⌘⇧C"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    OpenInBrowser {
        url: String,
    },
    CopyToClipboard {
        title: &'static str,
        content: String,
        shortcut: Option<Shortcut>,
    },
    /// Navigate to the summary view of the record.
    PushSummary {
        shortcut: Shortcut,
    },
}

impl ListAction {
    pub fn title(&self) -> &'static str {
        match self {
            ListAction::OpenInBrowser { .. } => "Open in Browser",
            ListAction::CopyToClipboard { title, .. } => *title,
            ListAction::PushSummary { .. } => "View Summary",
        }
    }

    pub fn shortcut(&self) -> Option<Shortcut> {
        match self {
            ListAction::OpenInBrowser { .. } => None,
            ListAction::CopyToClipboard { shortcut, .. } => *shortcut,
            ListAction::PushSummary { shortcut } => Some(*shortcut),
        }
    }
}

fn link_actions(record: &PluginRecord) -> Vec<ListAction> {
    vec![
        ListAction::OpenInBrowser {
            url: record.url.clone(),
        },
        ListAction::CopyToClipboard {
            title: "Copy URL to Clipboard",
            content: record.url.clone(),
            shortcut: None,
        },
    ]
}

/// Actions for a list item. `View Summary` needs a configured LLM.
pub fn item_actions(record: &PluginRecord, ai_available: bool) -> Vec<ListAction> {
    let mut actions = link_actions(record);
    if ai_available {
        actions.push(ListAction::PushSummary {
            shortcut: Shortcut::CmdShiftEnter,
        });
    }
    actions
}

/// Actions of the summary view. While the summary is still loading (or
/// failed) the copy action carries an empty body.
pub fn summary_actions(record: &PluginRecord, summary: Option<&Summary>) -> Vec<ListAction> {
    let mut actions = link_actions(record);
    actions.push(ListAction::CopyToClipboard {
        title: "Copy Summary To Clipboard",
        content: summary.map(|s| s.markdown.clone()).unwrap_or_default(),
        shortcut: Some(Shortcut::CmdShiftEnter),
    });
    if let Some(snippet) = summary.and_then(|s| s.snippet.as_ref()) {
        actions.push(ListAction::CopyToClipboard {
            title: "Copy Snippet To Clipboard",
            content: snippet.clone(),
            shortcut: Some(Shortcut::CmdShiftC),
        });
    }
    actions
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: Option<&'static str>,
    pub subtitle: Option<String>,
}

/// Live results get a titled section with the count; suggestions don't.
pub fn section_for(view: &ResultsView) -> Section {
    if view.is_live() {
        Section {
            title: Some(SECTION_TITLE),
            subtitle: Some(view.records().len().to_string()),
        }
    } else {
        Section {
            title: None,
            subtitle: None,
        }
    }
}

pub fn shows_detail(view: &ResultsView) -> bool {
    view.is_live()
}

/// Error line for a failed search, hidden while a newer search is loading.
pub fn failure_notice(view: &ResultsView, loading: bool) -> Option<String> {
    match view {
        ResultsView::Failed { query, message } if !loading => {
            Some(format!("search for \"{query}\" failed: {message}"))
        }
        _ => None,
    }
}
