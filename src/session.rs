//! Line-oriented interactive session over the sync controller.
//!
//! Each input line is one event. The device position lookup runs alongside
//! the input loop and is applied whenever it resolves.

use std::fmt::Write as _;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::db::PlaceStore;
use crate::map::{render_markers, LocateTask, LocationError, MemorySurface};
use crate::models::{Coordinate, Place};
use crate::sync::{Submission, SyncController};

const HELP: &str = "\
commands:
  click LAT LON   mark the location of the new place
  name TEXT       set the name
  desc TEXT       set the description
  submit          add the place to the map
  draft           show the place being added
  list            list saved places
  markers         show the rendered map
  help            show this help
  quit            leave the session
";

const NO_LOCATION_HINT: &str = "click the map to mark the location";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Click { lat: f64, lon: f64 },
    Name(String),
    Description(String),
    Submit,
    Draft,
    List,
    Markers,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.trim().is_empty() {
            return Ok(None);
        }

        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (trimmed, ""),
        };

        let command = match word {
            "click" => {
                let mut parts = rest.split_whitespace();
                let usage = CommandError::Usage("click LAT LON");
                let lat = parts.next().and_then(|v| v.parse().ok());
                let lon = parts.next().and_then(|v| v.parse().ok());
                match (lat, lon, parts.next()) {
                    (Some(lat), Some(lon), None) => Self::Click { lat, lon },
                    _ => return Err(usage),
                }
            }
            "name" => Self::Name(rest.to_string()),
            "desc" | "description" => Self::Description(rest.to_string()),
            "submit" => Self::Submit,
            "draft" => Self::Draft,
            "list" => Self::List,
            "markers" => Self::Markers,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Render places one per line, in insertion order.
pub fn format_places(places: &[Place]) -> String {
    let mut output = String::new();
    for (i, place) in places.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {} [{}] {}",
            i + 1,
            place.name(),
            place.coordinate(),
            place.description()
        );
    }
    output
}

/// Handle one command and return the text to show.
pub fn handle<P: PlaceStore>(
    controller: &mut SyncController<P, MemorySurface>,
    command: Command,
) -> String {
    match command {
        Command::Click { lat, lon } => match controller.on_map_click(lat, lon) {
            Ok(coordinate) => format!("location set to {}\n", coordinate),
            Err(e) => format!("click ignored: {}\n", e),
        },
        Command::Name(name) => {
            controller.set_name(name);
            String::new()
        }
        Command::Description(description) => {
            controller.set_description(description);
            String::new()
        }
        Command::Submit => match controller.submit() {
            Submission::Committed { place, publication } => {
                let mut output = format!(
                    "added {} ({} places)\n",
                    place.name(),
                    controller.places().len()
                );
                if !publication.persisted {
                    output.push_str("warning: the place could not be saved\n");
                }
                if !publication.rendered {
                    output.push_str("warning: the map could not be updated\n");
                }
                push_location_hint(controller, &mut output);
                output
            }
            Submission::Rejected(reason) => format!("not added: {}\n", reason),
        },
        Command::Draft => format_draft(controller),
        Command::List => format_places(controller.places()),
        Command::Markers => render_markers(controller.map().surface()),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}

fn format_draft<P: PlaceStore>(controller: &SyncController<P, MemorySurface>) -> String {
    let draft = controller.draft();
    let location = draft
        .coordinate()
        .map(|c: Coordinate| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut output = format!(
        "name: {}\ndescription: {}\nlocation: {}\n",
        draft.name(),
        draft.description(),
        location
    );
    push_location_hint(controller, &mut output);
    output
}

fn push_location_hint<P: PlaceStore>(
    controller: &SyncController<P, MemorySurface>,
    output: &mut String,
) {
    if !controller.can_submit() {
        output.push_str(NO_LOCATION_HINT);
        output.push('\n');
    }
}

async fn located(task: &mut Option<LocateTask>) -> Result<Coordinate, LocationError> {
    match task {
        Some(task) => task.resolved().await,
        None => std::future::pending().await,
    }
}

/// Run the session until `quit` or end of input.
pub async fn run<P, R, W>(
    controller: &mut SyncController<P, MemorySurface>,
    mut locate: Option<LocateTask>,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    P: PlaceStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut locating = locate.is_some();

    output.write_all(NO_LOCATION_HINT.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;

    loop {
        tokio::select! {
            biased;

            outcome = located(&mut locate), if locating => {
                locating = false;
                if let Some(viewport) = controller.on_location(outcome) {
                    tracing::debug!(center = %viewport.center, zoom = viewport.zoom, "Viewport set");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let text = match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => handle(controller, command),
                    Ok(None) => String::new(),
                    Err(e) => format!("{}\n", e),
                };
                output.write_all(text.as_bytes()).await?;
                output.flush().await?;
            }
        }
    }

    if let Some(task) = locate {
        task.cancel();
    }
    Ok(())
}
