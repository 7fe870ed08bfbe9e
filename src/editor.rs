/*!
 * Editor session for one open subtitle document.
 *
 * The session owns the cue collection together with the playhead state
 * reported by the player, and exposes the edits offered by the cue list:
 * adding a cue at the playhead, nudging or snapping either edge, editing
 * text, deleting, and computing seek targets. All edits go through
 * `CueCollection::update`, so a stale `CueId` silently does nothing.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::app_config::EditorConfig;
use crate::cue_collection::{CueCollection, CueId, CueRecord};
use crate::errors::{CommandError, EditorError};
use crate::file_utils::FileManager;
use crate::subtitle_codec::{Cue, SrtCodec};

// @const: Window title prefix
const APP_TITLE: &str = "SubsEdit";

/// Which end of a cue an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueEdge {
    /// The `from` time
    Start,
    /// The `to` time
    End,
}

impl CueEdge {
    // @returns: Time of this edge on the cue
    pub fn time_of(self, cue: &Cue) -> u64 {
        match self {
            Self::Start => cue.from,
            Self::End => cue.to,
        }
    }

    // @returns: Copy of cue with this edge moved
    pub fn with_time(self, cue: &Cue, ms: u64) -> Cue {
        let mut updated = cue.clone();
        match self {
            Self::Start => updated.from = ms,
            Self::End => updated.to = ms,
        }
        updated
    }
}

impl fmt::Display for CueEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

impl FromStr for CueEdge {
    type Err = CommandError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" | "from" => Ok(Self::Start),
            "end" | "to" => Ok(Self::End),
            _ => Err(CommandError::InvalidArgument {
                argument: "edge".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Convert a player time in seconds to whole milliseconds.
///
/// Negative and non-finite values clamp to zero.
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

/// Convert milliseconds to the seconds value sent to the player
pub fn ms_to_seconds(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

/// Format milliseconds as a playback clock (`m:ss.mmm`, or `h:mm:ss.mmm` past an hour)
pub fn format_clock(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    } else {
        format!("{}:{:02}.{:03}", minutes, seconds, millis)
    }
}

/// One open document plus the playhead it is edited against
#[derive(Debug)]
pub struct EditorSession {
    // @field: Cues of the open document
    cues: CueCollection,

    // @field: Where save writes to
    document_path: Option<PathBuf>,

    // @field: Last reported playhead
    position_ms: u64,

    // @field: Last reported media duration
    duration_ms: u64,

    // @field: Editing behavior
    settings: EditorConfig,
}

impl EditorSession {
    /// Create a session with an empty, unsaved document
    pub fn new(settings: EditorConfig) -> Self {
        Self {
            cues: CueCollection::new(),
            document_path: None,
            position_ms: 0,
            duration_ms: settings.initial_duration_ms,
            settings,
        }
    }

    pub fn cues(&self) -> &CueCollection {
        &self.cues
    }

    pub fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    // @returns: Title shown for the open document
    pub fn title(&self) -> String {
        match &self.document_path {
            Some(path) => format!("{} - {}", APP_TITLE, path.display()),
            None => APP_TITLE.to_string(),
        }
    }

    // @returns: "position / duration"
    pub fn clock(&self) -> String {
        format!("{} / {}", format_clock(self.position_ms), format_clock(self.duration_ms))
    }

    /// Start over with an empty document. The save path is kept.
    pub fn new_document(&mut self) {
        self.load_document("");
    }

    /// Replace all cues with the ones parsed from `document`.
    ///
    /// Handles into the previous document stop matching.
    pub fn load_document(&mut self, document: &str) {
        self.cues.load(SrtCodec::parse(document));
        debug!("Document loaded with {} cues", self.cues.len());
    }

    /// Read and load an SRT file, remembering its path for save
    pub fn open_document<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)
            .with_context(|| format!("Failed to open subtitle file: {}", path.display()))?;

        self.load_document(&content);
        self.document_path = Some(path.to_path_buf());
        info!("Opened {} ({} cues)", path.display(), self.cues.len());
        Ok(())
    }

    /// Choose where the next save writes without touching the cues
    pub fn set_document_path<P: AsRef<Path>>(&mut self, path: P) {
        self.document_path = Some(path.as_ref().to_path_buf());
    }

    /// Serialize the sorted view of the document
    pub fn render_document(&self) -> String {
        self.cues.to_srt()
    }

    /// Write the document to its current path
    pub fn save(&self) -> Result<PathBuf> {
        let path = self.document_path.clone().ok_or(EditorError::NoDocumentPath)?;
        FileManager::write_to_file(&path, &self.render_document())?;
        info!("Saved {} cues to {}", self.cues.len(), path.display());
        Ok(path)
    }

    /// Point the document at `path`, then save
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<PathBuf> {
        self.document_path = Some(path.as_ref().to_path_buf());
        self.save()
    }

    /// Record a playhead update from the player
    pub fn update_position(&mut self, seconds: f64) {
        self.position_ms = seconds_to_ms(seconds);
    }

    /// Record a duration update from the player
    pub fn update_duration(&mut self, seconds: f64) {
        self.duration_ms = seconds_to_ms(seconds);
    }

    /// Add a zero-length cue at the playhead
    pub fn add_cue_at_position(&mut self) -> CueId {
        let cue = Cue::new(self.position_ms, self.position_ms, self.settings.new_cue_text.clone());
        self.cues.add(cue)
    }

    /// Move one edge by `steps` nudge steps, clamping at zero
    pub fn nudge(&mut self, id: CueId, edge: CueEdge, steps: i64) {
        if let Some(cue) = self.cues.get(id) {
            let delta = steps.unsigned_abs().saturating_mul(self.settings.nudge_step_ms);
            let current = edge.time_of(cue);
            let moved = if steps < 0 {
                current.saturating_sub(delta)
            } else {
                current.saturating_add(delta)
            };
            let updated = edge.with_time(cue, moved);
            self.cues.update(id, updated);
        }
    }

    /// Snap one edge to the playhead
    pub fn set_edge_to_position(&mut self, id: CueId, edge: CueEdge) {
        self.set_edge(id, edge, self.position_ms);
    }

    /// Set one edge to an explicit time
    pub fn set_edge(&mut self, id: CueId, edge: CueEdge, ms: u64) {
        if let Some(cue) = self.cues.get(id) {
            let updated = edge.with_time(cue, ms);
            self.cues.update(id, updated);
        }
    }

    /// Replace the text of a cue
    pub fn set_text(&mut self, id: CueId, text: impl Into<String>) {
        if let Some(cue) = self.cues.get(id) {
            let updated = Cue {
                text: text.into(),
                ..cue.clone()
            };
            self.cues.update(id, updated);
        }
    }

    pub fn delete(&mut self, id: CueId) {
        self.cues.remove(id);
    }

    /// Seconds to seek to for one edge of a cue
    pub fn seek_target(&self, id: CueId, edge: CueEdge) -> Option<f64> {
        self.cues.get(id).map(|cue| ms_to_seconds(edge.time_of(cue)))
    }

    /// Handle of the cue at a 1-based position of the sorted view
    pub fn cue_id_at(&self, position: usize) -> Option<CueId> {
        position
            .checked_sub(1)
            .and_then(|index| self.cues.sorted_view().get(index).map(|record| record.id))
    }

    /// Like [`cue_id_at`](Self::cue_id_at) but reports a missing position
    pub fn require_cue_at(&self, position: usize) -> std::result::Result<CueId, EditorError> {
        self.cue_id_at(position).ok_or(EditorError::UnknownCue(position))
    }

    pub fn is_active(&self, cue: &Cue) -> bool {
        cue.is_active_at(self.position_ms)
    }

    /// Cues under the playhead, in sorted order
    pub fn active_cues(&self) -> Vec<&CueRecord> {
        self.cues.active_at(self.position_ms)
    }
}
