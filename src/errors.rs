/*!
 * Error types for the subsedit application.
 *
 * The codec and the cue collection never fail, so nothing here describes
 * parsing problems. These types cover the player process, the editor
 * session and the interactive console, using the thiserror crate for
 * ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while talking to the media player
#[derive(Error, Debug)]
pub enum PlayerError {
    /// The player process could not be started
    #[error("Failed to start player: {0}")]
    SpawnFailed(String),

    /// Error establishing or maintaining the IPC connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A request did not get a reply in time
    #[error("Player request timed out: {0}")]
    Timeout(String),

    /// The player answered a command with an error
    #[error("Player rejected '{command}': {message}")]
    CommandFailed {
        /// Name of the rejected command
        command: String,
        /// Error string reported by the player
        message: String,
    },

    /// A message from the player could not be understood
    #[error("Invalid player message: {0}")]
    ProtocolError(String),

    /// No player is running
    #[error("No player is running")]
    NotRunning,

    /// Underlying socket or process I/O failure
    #[error("Player I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur in the editor session
#[derive(Error, Debug)]
pub enum EditorError {
    /// Save was requested before the document had a path
    #[error("Document has no file path yet, use save-as")]
    NoDocumentPath,

    /// A cue position that does not exist in the list
    #[error("No cue at position {0}")]
    UnknownCue(usize),
}

/// Errors produced while reading a console command line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing was typed
    #[error("Empty command")]
    Empty,

    /// The first word is not a known command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument is absent
    #[error("Missing {argument} for '{command}'")]
    MissingArgument {
        /// Command being parsed
        command: String,
        /// Name of the absent argument
        argument: String,
    },

    /// An argument is present but unusable
    #[error("Invalid {argument}: {value}")]
    InvalidArgument {
        /// Name of the argument
        argument: String,
        /// Value as typed
        value: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the player
    #[error("Player error: {0}")]
    Player(#[from] PlayerError),

    /// Error from the editor session
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Error from console input
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
