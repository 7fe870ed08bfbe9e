/*!
 * Line-oriented command console for the editor.
 *
 * Cues are addressed by their 1-based position in the time-sorted list,
 * the same numbering `list` prints. Commands that need the player fail
 * with `PlayerError::NotRunning` when no video is open.
 */

use anyhow::Result;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;
use std::path::PathBuf;
use std::str::FromStr;

use crate::editor::{format_clock, CueEdge, EditorSession};
use crate::errors::{CommandError, PlayerError};
use crate::player::Player;
use crate::subtitle_codec::Cue;

// @const: Explicit timestamp accepted by start/end
static TIMESTAMP_ARG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}:\d{2}:\d{2},\d{3}$").unwrap()
});

pub const HELP_TEXT: &str = "\
Commands (N is a cue number as shown by list):
  list                     show all cues, * marks cues under the playhead
  add                      add a cue at the playhead
  start N -|+|=|HH:MM:SS,mmm
  end N -|+|=|HH:MM:SS,mmm  nudge (repeat - or + for more steps), snap to playhead, or set
  text N TEXT              replace the text, \\n starts a new line
  delete N                 remove a cue
  seek N [start|end]       move the player to a cue edge
  time                     show the playhead
  new                      empty document
  open PATH                load a subtitle file
  video PATH               open a video in the player
  save                     write to the current file
  save-as PATH             write to another file
  help                     this text
  quit                     leave";

/// How a `start`/`end` command changes the edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeAdjustment {
    /// Move by this many nudge steps
    Nudge(i64),
    /// Move to the playhead
    SnapToPlayhead,
    /// Move to an explicit time in ms
    Set(u64),
}

impl FromStr for TimeAdjustment {
    type Err = CommandError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "=" {
            return Ok(Self::SnapToPlayhead);
        }

        if !s.is_empty() && s.chars().all(|c| c == '-') {
            return Ok(Self::Nudge(-(s.len() as i64)));
        }

        if !s.is_empty() && s.chars().all(|c| c == '+') {
            return Ok(Self::Nudge(s.len() as i64));
        }

        if TIMESTAMP_ARG_REGEX.is_match(s) {
            return Ok(Self::Set(Cue::parse_timestamp(s)));
        }

        Err(CommandError::InvalidArgument {
            argument: "time adjustment".to_string(),
            value: s.to_string(),
        })
    }
}

/// One parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    List,
    Add,
    Retime {
        position: usize,
        edge: CueEdge,
        adjustment: TimeAdjustment,
    },
    Text {
        position: usize,
        text: String,
    },
    Delete {
        position: usize,
    },
    Seek {
        position: usize,
        edge: CueEdge,
    },
    Time,
    New,
    Open(PathBuf),
    Video(PathBuf),
    Save,
    SaveAs(PathBuf),
    Help,
    Quit,
}

// @splits: First word from the rest of the line
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn parse_position<'a>(
    command: &str,
    rest: &'a str,
) -> std::result::Result<(usize, &'a str), CommandError> {
    let (word, rest) = split_word(rest);
    if word.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            argument: "cue number".to_string(),
        });
    }

    let position = word.parse::<usize>().map_err(|_| CommandError::InvalidArgument {
        argument: "cue number".to_string(),
        value: word.to_string(),
    })?;

    Ok((position, rest))
}

fn require_path(command: &str, rest: &str) -> std::result::Result<PathBuf, CommandError> {
    let path = rest.trim();
    if path.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            argument: "path".to_string(),
        });
    }
    Ok(PathBuf::from(path))
}

impl FromStr for EditorCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let (name, rest) = split_word(line.trim());
        let name = name.to_lowercase();

        match name.as_str() {
            "" => Err(CommandError::Empty),
            "list" | "ls" => Ok(Self::List),
            "add" => Ok(Self::Add),
            "start" | "end" => {
                let edge = name.parse::<CueEdge>()?;
                let (position, rest) = parse_position(&name, rest)?;
                let (value, _) = split_word(rest);
                if value.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: name.clone(),
                        argument: "time adjustment".to_string(),
                    });
                }
                Ok(Self::Retime {
                    position,
                    edge,
                    adjustment: value.parse()?,
                })
            }
            "text" => {
                let (position, rest) = parse_position(&name, rest)?;
                Ok(Self::Text {
                    position,
                    text: rest.replace("\\n", "\n"),
                })
            }
            "delete" | "rm" => {
                let (position, _) = parse_position(&name, rest)?;
                Ok(Self::Delete { position })
            }
            "seek" => {
                let (position, rest) = parse_position(&name, rest)?;
                let (edge_word, _) = split_word(rest);
                let edge = if edge_word.is_empty() {
                    CueEdge::Start
                } else {
                    edge_word.parse()?
                };
                Ok(Self::Seek { position, edge })
            }
            "time" => Ok(Self::Time),
            "new" => Ok(Self::New),
            "open" => Ok(Self::Open(require_path(&name, rest)?)),
            "video" => Ok(Self::Video(require_path(&name, rest)?)),
            "save" => Ok(Self::Save),
            "save-as" | "saveas" => Ok(Self::SaveAs(require_path(&name, rest)?)),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(CommandError::UnknownCommand(name)),
        }
    }
}

/// What the caller should do after a command ran
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Print this (may be empty) and keep going
    Output(String),
    /// Open a video; the caller owns the player lifecycle
    OpenVideo(PathBuf),
    /// Leave the console
    Quit,
}

/// Render the cue list with 1-based numbers
pub fn render_cue_list(session: &EditorSession) -> String {
    let view = session.cues().sorted_view();
    if view.is_empty() {
        return "(no cues)".to_string();
    }

    let mut output = String::new();
    for (index, record) in view.iter().enumerate() {
        let marker = if session.is_active(&record.cue) { '*' } else { ' ' };
        let _ = writeln!(
            output,
            "{}{:>4}  {} --> {}  {}",
            marker,
            index + 1,
            format_clock(record.cue.from),
            format_clock(record.cue.to),
            record.cue.text.replace('\n', " | ")
        );
    }
    output.trim_end().to_string()
}

/// Run one command against the session.
///
/// `player` is `None` while no video is open.
pub async fn run_command(
    session: &mut EditorSession,
    player: Option<&dyn Player>,
    command: EditorCommand,
) -> Result<CommandOutcome> {
    let output = match command {
        EditorCommand::List => render_cue_list(session),
        EditorCommand::Add => {
            session.add_cue_at_position();
            format!("Added cue at {}", format_clock(session.position_ms()))
        }
        EditorCommand::Retime { position, edge, adjustment } => {
            let id = session.require_cue_at(position)?;
            match adjustment {
                TimeAdjustment::Nudge(steps) => session.nudge(id, edge, steps),
                TimeAdjustment::SnapToPlayhead => session.set_edge_to_position(id, edge),
                TimeAdjustment::Set(ms) => session.set_edge(id, edge, ms),
            }
            match session.cues().get(id) {
                Some(cue) => format!("{} {}", edge, format_clock(edge.time_of(cue))),
                None => String::new(),
            }
        }
        EditorCommand::Text { position, text } => {
            let id = session.require_cue_at(position)?;
            session.set_text(id, text);
            String::new()
        }
        EditorCommand::Delete { position } => {
            let id = session.require_cue_at(position)?;
            session.delete(id);
            format!("Deleted cue {}", position)
        }
        EditorCommand::Seek { position, edge } => {
            let id = session.require_cue_at(position)?;
            let player = player.ok_or(PlayerError::NotRunning)?;
            if let Some(seconds) = session.seek_target(id, edge) {
                player.seek(seconds).await?;
            }
            String::new()
        }
        EditorCommand::Time => session.clock(),
        EditorCommand::New => {
            session.new_document();
            "New document".to_string()
        }
        EditorCommand::Open(path) => {
            session.open_document(&path)?;
            session.title()
        }
        EditorCommand::Video(path) => return Ok(CommandOutcome::OpenVideo(path)),
        EditorCommand::Save => {
            let path = session.save()?;
            format!("Saved {}", path.display())
        }
        EditorCommand::SaveAs(path) => {
            let path = session.save_as(path)?;
            info!("{}", session.title());
            format!("Saved {}", path.display())
        }
        EditorCommand::Help => HELP_TEXT.to_string(),
        EditorCommand::Quit => return Ok(CommandOutcome::Quit),
    };

    Ok(CommandOutcome::Output(output))
}
