//! Side effects behind list actions: launching the browser and writing the
//! system clipboard.

use std::process::Command;

use anyhow::{Context, Result, bail};
use arboard::Clipboard;
use plugin_directory::presentation::ListAction;
use tracing::{debug, info};

/// What executing an action produced, for the status line.
#[derive(Debug, PartialEq, Eq)]
pub enum Executed {
    Opened(String),
    Copied(&'static str),
    /// The front-end has to navigate; nothing happened here.
    PushSummary,
}

pub fn execute(action: &ListAction) -> Result<Executed> {
    match action {
        ListAction::OpenInBrowser { url } => {
            open_in_browser(url)?;
            Ok(Executed::Opened(url.clone()))
        }
        ListAction::CopyToClipboard { title, content, .. } => {
            copy_to_clipboard(content)?;
            Ok(Executed::Copied(*title))
        }
        ListAction::PushSummary { .. } => Ok(Executed::PushSummary),
    }
}

/// Hands `url` to the platform opener without waiting for it.
pub fn open_in_browser(url: &str) -> Result<()> {
    if url.is_empty() || url == "#" {
        bail!("no link to open");
    }
    debug!(%url, "launching opener");
    opener(url)
        .spawn()
        .with_context(|| format!("failed to open '{url}'"))?;
    info!(%url, "opened in browser");
    Ok(())
}

#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

pub fn copy_to_clipboard(content: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("failed to access clipboard")?;
    clipboard
        .set_text(content.to_owned())
        .context("failed to write clipboard")?;
    debug!(bytes = content.len(), "copied to clipboard");
    Ok(())
}
