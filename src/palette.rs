//! Line-based terminal front-end.
//!
//! Every plain input line replaces the search text. Lines starting with `:`
//! are commands addressing the listed items by their 1-based position.

use std::sync::Arc;
use std::time::Duration;

use ai_llm_service::LlmService;
use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use plugin_directory::presentation::{
    DetailView, ListAction, MetadataEntry, SEARCH_PLACEHOLDER, SUMMARY_TITLE, failure_notice,
    item_actions, section_for, shows_detail, summary_actions,
};
use plugin_directory::{
    DirectoryClient, FetchOutcome, FetchTicket, IconRef, PluginRecord, QueryController, Settle,
    Summary, SummaryRequester,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::actions::{self, Executed};

const DESCRIPTION_WIDTH: usize = 72;

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Search(String),
    Open(usize),
    Copy(usize),
    Detail(usize),
    Summary(usize),
    CopySummary,
    CopySnippet,
    Back,
    Help,
    Quit,
}

/// Parses one input line. Commands take 1-based item numbers.
pub fn parse_input(line: &str) -> Result<Input> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Search(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    let index = || -> Result<usize> {
        let raw = arg.ok_or_else(|| anyhow!(":{name} needs an item number"))?;
        match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => bail!("'{raw}' is not an item number"),
        }
    };

    Ok(match name {
        "open" | "o" => Input::Open(index()?),
        "copy" | "c" => Input::Copy(index()?),
        "detail" | "d" => Input::Detail(index()?),
        "summary" | "s" => Input::Summary(index()?),
        "copy-summary" => Input::CopySummary,
        "snippet" => Input::CopySnippet,
        "back" | "b" => Input::Back,
        "help" | "h" => Input::Help,
        "quit" | "q" => Input::Quit,
        other => bail!("unknown command ':{other}' (try :help)"),
    })
}

/// First non-blank line of `text`, cut to `width` characters.
fn first_line(text: &str, width: usize) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.chars().count() <= width {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn icon_glyph(icon: Option<&IconRef>) -> char {
    match icon {
        Some(IconRef::Builtin(b)) => b.glyph(),
        _ => '•',
    }
}

/// Summary view that stays open until `:back` or a new search.
struct SummaryPanel {
    record: PluginRecord,
    summary: Option<Summary>,
}

pub struct Palette {
    controller: QueryController,
    client: Arc<DirectoryClient>,
    llm: Option<LlmService>,
    throttle: Duration,
    panel: Option<SummaryPanel>,
}

impl Palette {
    pub fn new(client: DirectoryClient, llm: Option<LlmService>, throttle: Duration) -> Self {
        Self {
            controller: QueryController::new(),
            client: Arc::new(client),
            llm,
            throttle,
            panel: None,
        }
    }

    fn ai_available(&self) -> bool {
        self.llm.is_some()
    }

    /// Runs until `:quit` or end of input.
    pub async fn run(mut self) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        print_help();
        self.render_list();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read stdin")? else {
                        debug!("stdin closed");
                        break;
                    };
                    match parse_input(&line) {
                        Ok(Input::Quit) => break,
                        Ok(input) => self.handle(input, &tx).await,
                        Err(e) => print_error(&e),
                    }
                }
                Some(outcome) = rx.recv() => {
                    if self.controller.settle(outcome) == Settle::Applied {
                        self.render_list();
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle(&mut self, input: Input, tx: &mpsc::UnboundedSender<FetchOutcome>) {
        let result = match input {
            Input::Search(text) => {
                self.panel = None;
                if let Some(ticket) = self.controller.set_search_text(text) {
                    self.spawn_fetch(ticket, tx.clone());
                }
                self.render_list();
                Ok(())
            }
            Input::Open(n) => self.item_action(n, |a| matches!(a, ListAction::OpenInBrowser { .. })),
            Input::Copy(n) => {
                self.item_action(n, |a| matches!(a, ListAction::CopyToClipboard { .. }))
            }
            Input::Detail(n) => self.render_detail(n),
            Input::Summary(n) => self.open_summary(n).await,
            Input::CopySummary => self.panel_action("Copy Summary To Clipboard"),
            Input::CopySnippet => self.panel_action("Copy Snippet To Clipboard"),
            Input::Back => {
                self.panel = None;
                self.render_list();
                Ok(())
            }
            Input::Help => {
                print_help();
                Ok(())
            }
            Input::Quit => Ok(()),
        };
        if let Err(e) = result {
            print_error(&e);
        }
    }

    fn spawn_fetch(&self, ticket: FetchTicket, tx: mpsc::UnboundedSender<FetchOutcome>) {
        let client = Arc::clone(&self.client);
        let throttle = self.throttle;
        tokio::spawn(async move {
            if let Some(outcome) = ticket.run(client.as_ref(), throttle).await {
                // The receiver only goes away on shutdown.
                let _ = tx.send(outcome);
            }
        });
    }

    fn record_at(&self, n: usize) -> Result<&PluginRecord> {
        self.controller
            .view()
            .records()
            .get(n - 1)
            .ok_or_else(|| anyhow!("no item {n} in the list"))
    }

    fn item_action(&self, n: usize, pick: impl Fn(&ListAction) -> bool) -> Result<()> {
        let record = self.record_at(n)?;
        let action = item_actions(record, self.ai_available())
            .into_iter()
            .find(|a| pick(a))
            .ok_or_else(|| anyhow!("action not available for item {n}"))?;
        report(actions::execute(&action)?);
        Ok(())
    }

    fn panel_action(&self, title: &str) -> Result<()> {
        let panel = self
            .panel
            .as_ref()
            .context("open a summary first with :summary N")?;
        let action = summary_actions(&panel.record, panel.summary.as_ref())
            .into_iter()
            .find(|a| a.title() == title)
            .ok_or_else(|| anyhow!("'{title}' is not available for this summary"))?;
        report(actions::execute(&action)?);
        Ok(())
    }

    async fn open_summary(&mut self, n: usize) -> Result<()> {
        let Some(llm) = self.llm.as_ref() else {
            bail!("AI summaries are unavailable: set LLM_KIND to enable them");
        };
        if !self.controller.view().is_live() {
            bail!("summaries are available for search results only");
        }
        let record = self.record_at(n)?.clone();

        println!("\n{}  {}", SUMMARY_TITLE.bold(), record.name.cyan());
        println!("{}", "generating…".dimmed());

        let mut requester = SummaryRequester::new(llm, record.clone())
            .context("failed to build the summary prompt")?;
        let summary = match requester.request().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, plugin = %record.name, "summary unavailable");
                None
            }
        };

        println!("{}", requester.markdown());
        self.panel = Some(SummaryPanel { record, summary });
        if let Some(panel) = &self.panel {
            print_actions(&summary_actions(&panel.record, panel.summary.as_ref()));
        }
        Ok(())
    }

    fn render_list(&self) {
        let view = self.controller.view();
        let text = self.controller.search_text();

        println!();
        if text.is_empty() {
            println!("{}", SEARCH_PLACEHOLDER.dimmed());
        } else if self.controller.is_loading() {
            println!("{} {}", format!("> {text}").bold(), "loading…".yellow());
        } else {
            println!("{}", format!("> {text}").bold());
        }

        let section = section_for(view);
        if let Some(title) = section.title {
            let count = section.subtitle.unwrap_or_default();
            println!("{} {}", title.underline(), count.dimmed());
        }

        if let Some(notice) = failure_notice(view, self.controller.is_loading()) {
            println!("{} {}", "Error:".red().bold(), notice);
        }

        for (i, record) in view.records().iter().enumerate() {
            println!(
                "{:>3}. {} {}  {}",
                i + 1,
                icon_glyph(record.icon.as_ref()),
                record.name.bold(),
                first_line(&record.description, DESCRIPTION_WIDTH).dimmed()
            );
        }
    }

    fn render_detail(&self, n: usize) -> Result<()> {
        if !shows_detail(self.controller.view()) {
            bail!("details are shown for search results only");
        }
        let record = self.record_at(n)?;
        let detail = DetailView::for_record(record);

        println!("\n{}", record.name.bold());
        println!("{}", detail.markdown.trim());
        println!();
        for entry in &detail.metadata {
            match entry {
                MetadataEntry::Link {
                    title,
                    target,
                    text,
                } => println!("  {:<22} {} ({})", title.dimmed(), text, target.blue()),
                MetadataEntry::Label { title, text } => {
                    println!("  {:<22} {}", title.dimmed(), text)
                }
            }
        }
        print_actions(&item_actions(record, self.ai_available()));
        Ok(())
    }
}

fn print_actions(actions: &[ListAction]) {
    let rendered: Vec<String> = actions
        .iter()
        .map(|a| match a.shortcut() {
            Some(s) => format!("{} ({s})", a.title()),
            None => a.title().to_string(),
        })
        .collect();
    println!("{}", rendered.join(" · ").dimmed());
}

fn report(executed: Executed) {
    match executed {
        Executed::Opened(url) => println!("{} {}", "opened".green(), url),
        Executed::Copied(what) => println!("{} {}", "done:".green(), what),
        Executed::PushSummary => {}
    }
}

fn print_error(e: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), e);
}

fn print_help() {
    println!(
        "{}",
        "type to search · :open N · :copy N · :detail N · :summary N · \
         :copy-summary · :snippet · :back · :quit"
            .dimmed()
    );
}

#[cfg(test)]
mod tests {
    use plugin_directory::BuiltinIcon;

    use super::*;

    #[test]
    fn plain_lines_are_search_text() {
        assert_eq!(
            parse_input("contact form\n").unwrap(),
            Input::Search("contact form".into())
        );
        assert_eq!(parse_input("").unwrap(), Input::Search(String::new()));
    }

    #[test]
    fn commands_take_item_numbers() {
        assert_eq!(parse_input(":open 2").unwrap(), Input::Open(2));
        assert_eq!(parse_input(":s 1").unwrap(), Input::Summary(1));
        assert_eq!(parse_input(":snippet").unwrap(), Input::CopySnippet);
        assert_eq!(parse_input(":q").unwrap(), Input::Quit);
    }

    #[test]
    fn bad_commands_are_rejected() {
        assert!(parse_input(":open").is_err());
        assert!(parse_input(":open 0").is_err());
        assert!(parse_input(":copy x").is_err());
        assert!(parse_input(":frobnicate").is_err());
    }

    #[test]
    fn first_line_skips_blanks_and_truncates() {
        assert_eq!(first_line("\n\n  Fast cache\nmore", 72), "Fast cache");
        assert_eq!(first_line("abcdef", 4), "abc…");
        assert_eq!(first_line("", 4), "");
    }

    #[test]
    fn builtin_icons_render_their_glyph() {
        assert_eq!(icon_glyph(Some(&IconRef::Builtin(BuiltinIcon::Hammer))), '🔨');
        assert_eq!(icon_glyph(None), '•');
    }
}
