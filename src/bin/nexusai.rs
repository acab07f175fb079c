//! Terminal front-end for the NexusAI widget core.
//!
//! Subscribes to the session's display models, prints them with the
//! markup stripped, and drives the session from stdin. Plain input sends
//! a message; commands: `/new`, `/list`, `/switch <n>`, `/delete <n>`,
//! `/quit`.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use regex::Regex;

use nexusai_widget::config::WidgetConfig;
use nexusai_widget::conversation::ConversationStore;
use nexusai_widget::dispatch::HttpDispatcher;
use nexusai_widget::format::TextFormatter;
use nexusai_widget::render::{
    ConversationListEntry, ConversationListView, RenderSink, TranscriptView,
};
use nexusai_widget::session::{ConfirmationGate, ConversationSession};
use nexusai_widget::storage::FileStorage;

/// Environment variable selecting the storage directory.
const DATA_DIR_ENV: &str = "NEXUSAI_DATA_DIR";
/// Default storage directory.
const DEFAULT_DATA_DIR: &str = "data";

/// Sink printing transcripts as they change and keeping the latest list
/// for the `/list` and index-based commands.
struct TerminalSink {
    tag: Regex,
    list: Mutex<ConversationListView>,
}

impl TerminalSink {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            tag: Regex::new("<[^>]+>")?,
            list: Mutex::new(ConversationListView::default()),
        })
    }

    /// Strip display markup down to terminal text.
    fn plain(&self, body: &str) -> String {
        let text = body
            .replace("</p><p>", "\n\n")
            .replace("<br>", "\n")
            .replace("<li>", "  - ")
            .replace("</li>", "\n");
        self.tag.replace_all(&text, "").into_owned()
    }

    fn latest_list(&self) -> ConversationListView {
        self.list
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RenderSink for TerminalSink {
    fn transcript_changed(&self, view: &TranscriptView) {
        println!("{}", "-".repeat(60));
        match view {
            TranscriptView::Empty { body } => println!("{}", self.plain(body)),
            TranscriptView::Conversation { groups } => {
                for group in groups {
                    for body in &group.bodies {
                        println!("[{}] {}", group.role.as_str(), self.plain(body));
                    }
                }
            }
        }
    }

    fn conversation_list_changed(&self, view: &ConversationListView) {
        let mut list = self.list.lock().unwrap_or_else(PoisonError::into_inner);
        *list = view.clone();
    }

    fn busy_changed(&self, busy: bool) {
        if busy {
            println!("...");
        }
    }
}

/// y/N confirmation on stdin.
struct StdinGate;

impl ConfirmationGate for StdinGate {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Resolve an index argument against the latest rendered list.
fn indexed_entry(sink: &TerminalSink, arg: Option<&str>) -> Option<ConversationListEntry> {
    let index: usize = arg?.parse().ok()?;
    sink.latest_list().entries.get(index).cloned()
}

/// Handle a `/command`; returns `false` when the loop should stop.
async fn handle_command(session: &ConversationSession, sink: &TerminalSink, command: &str) -> bool {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") => return false,
        Some("new") => {
            session.start_new_conversation().await;
        }
        Some("list") => {
            let list = sink.latest_list();
            if list.entries.is_empty() {
                println!("(no saved conversations)");
            }
            for (index, entry) in list.entries.iter().enumerate() {
                let marker = if entry.active { "*" } else { " " };
                println!("{marker} {index}: {}", entry.title);
            }
        }
        Some("switch") => {
            if let Some(entry) = indexed_entry(sink, parts.next()) {
                session.switch_conversation(entry.id).await;
            } else {
                println!("usage: /switch <n>");
            }
        }
        Some("delete") => {
            if let Some(entry) = indexed_entry(sink, parts.next()) {
                if !session.delete_conversation(entry.id).await {
                    println!("deletion cancelled");
                }
            } else {
                println!("usage: /delete <n>");
            }
        }
        _ => println!("unknown command: /{command}"),
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let data_dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let store = ConversationStore::load(Box::new(FileStorage::new(&data_dir)));

    let config = WidgetConfig::from_env().context("invalid chat endpoint")?;
    let dispatcher =
        Arc::new(HttpDispatcher::new(&config).context("failed to build HTTP client")?);
    let sink = Arc::new(TerminalSink::new().context("failed to build terminal sink")?);
    let formatter = TextFormatter::new().context("failed to build formatter")?;

    println!("NexusAI terminal widget, endpoint {}", config.endpoint);
    println!("Type a message, or /new, /list, /switch <n>, /delete <n>, /quit.");

    let session = ConversationSession::new(
        store,
        dispatcher,
        Arc::new(StdinGate),
        Arc::clone(&sink) as Arc<dyn RenderSink>,
        formatter,
    )
    .await;

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if let Some(command) = input.strip_prefix('/') {
            if !handle_command(&session, &sink, command).await {
                break;
            }
            continue;
        }
        if let Err(err) = session.submit_user_message(input).await {
            println!("{err}");
        }
    }
    Ok(())
}
