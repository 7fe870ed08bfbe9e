/*!
 * Media player collaborators.
 *
 * The editor never decodes video itself. It drives an external player
 * through the `Player` trait and receives playhead updates as
 * `PlayerEvent`s over a channel:
 * - `mpv`: mpv launched as a child process, controlled over its JSON IPC socket
 * - `mock`: in-memory player recording the commands it receives
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::PlayerError;

/// Notification pushed by a running player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Playhead position in seconds
    Position(f64),
    /// Media duration in seconds
    Duration(f64),
    /// The player went away
    Exited,
}

/// Common trait for media players the editor can drive
#[async_trait]
pub trait Player: Send + Sync + Debug {
    /// Seek to an absolute position
    ///
    /// # Arguments
    /// * `seconds` - Target position from the start of the media
    async fn seek(&self, seconds: f64) -> Result<(), PlayerError>;

    /// Replace the media being played
    ///
    /// # Arguments
    /// * `path` - Video file to open
    async fn load_file(&self, path: &Path) -> Result<(), PlayerError>;
}

pub mod mpv;
pub mod mock;
