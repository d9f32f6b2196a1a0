//! Inspecting and resetting persisted widget chrome from the command line.

use hackertab_core::{ChromeStore, KeyValueStore, PersistedWidgetState, StorageError};
use thiserror::Error;

/// Command-line errors.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("{0}")]
    Usage(String),
    #[error("Invalid config: {0}")]
    Config(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every persisted widget state.
    List,
    /// Remove one widget's state, or all of them.
    Reset(Option<String>),
    Help,
}

pub const USAGE: &str = "usage: hackertab [list | reset [WIDGET_ID] | help]";

impl Command {
    /// Parse arguments (without the program name).
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, InspectError> {
        let mut args = args.into_iter();
        let command = match args.next().as_deref() {
            None | Some("list") => Command::List,
            Some("reset") => Command::Reset(args.next()),
            Some("help") | Some("-h") | Some("--help") => Command::Help,
            Some(other) => {
                return Err(InspectError::Usage(format!("unknown command '{}'\n{}", other, USAGE)));
            }
        };
        if let Some(extra) = args.next() {
            return Err(InspectError::Usage(format!("unexpected argument '{}'\n{}", extra, USAGE)));
        }
        Ok(command)
    }
}

/// One line describing a widget's persisted chrome.
pub fn format_state(id: &str, state: &PersistedWidgetState) -> String {
    let mut flags = Vec::new();
    if state.minimized {
        flags.push("minimized");
    }
    if state.locked {
        flags.push("locked");
    }
    format!(
        "{:<20} x={:<6} y={:<6} tier={} {}",
        id,
        state.position.x,
        state.position.y,
        state.size_tier,
        flags.join(",")
    )
    .trim_end()
    .to_string()
}

/// Run a command and return its output.
pub async fn run<S: KeyValueStore>(command: &Command, store: &ChromeStore<S>) -> Result<String, InspectError> {
    match command {
        Command::Help => Ok(USAGE.to_string()),
        Command::List => {
            let states = store.load_all().await?;
            if states.is_empty() {
                return Ok("no widget state persisted".to_string());
            }
            Ok(states
                .iter()
                .map(|(id, state)| format_state(id, state))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Reset(Some(id)) => {
            store.remove(id).await?;
            log::info!("Reset widget {}", id);
            Ok(format!("reset {}", id))
        }
        Command::Reset(None) => {
            let removed = store.clear().await?;
            log::info!("Reset {} widget(s)", removed.len());
            Ok(format!("reset {} widget(s)", removed.len()))
        }
    }
}
