use std::fmt;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::subtitle_codec::{Cue, SrtCodec};

// @module: Editable cue collection with a derived time-sorted view

/// Stable handle to a cue inside a [`CueCollection`].
///
/// Ids are assigned when a cue enters the collection and are never reused by
/// that collection, so a handle kept across a reload simply stops matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CueId(u64);

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Timing statistics over a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    /// Number of cues
    pub cue_count: usize,
    /// Earliest start
    pub first_start_ms: Option<u64>,
    /// Latest end
    pub last_end_ms: Option<u64>,
    /// Cues ending after the next cue in the sorted view starts
    pub overlapping: usize,
    /// Cues with `from == to`
    pub zero_length: usize,
    /// Cues with `to < from`
    pub reversed: usize,
}

// @struct: Cue paired with its handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueRecord {
    // @field: Handle assigned on insertion
    pub id: CueId,

    // @field: Cue value
    pub cue: Cue,
}

/// Collection of cues for one open document.
///
/// Records are kept in insertion order. Mutations address records by
/// [`CueId`]; an unknown id is ignored rather than reported. No field
/// validation happens here, reversed or zero-length cues are accepted.
#[derive(Debug, Default)]
pub struct CueCollection {
    // @field: Records in insertion order
    records: Vec<CueRecord>,

    // @field: Next id to hand out
    next_id: u64,
}

impl CueCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an SRT document into a new collection
    pub fn from_srt(document: &str) -> Self {
        let mut collection = Self::new();
        collection.load(SrtCodec::parse(document));
        collection
    }

    /// Replace the whole contents with `cues`.
    ///
    /// The new record list is built before the old one is dropped, so callers
    /// never observe a mix of both. Every cue gets a fresh id.
    pub fn load(&mut self, cues: Vec<Cue>) {
        let records: Vec<CueRecord> = cues
            .into_iter()
            .map(|cue| CueRecord { id: self.allocate_id(), cue })
            .collect();

        debug!("Loaded {} cues (replacing {})", records.len(), self.records.len());
        self.records = records;
    }

    /// Append a cue and return its handle
    pub fn add(&mut self, cue: Cue) -> CueId {
        let id = self.allocate_id();
        self.records.push(CueRecord { id, cue });
        id
    }

    /// Replace the cue behind `id` in place. Unknown ids are a no-op.
    pub fn update(&mut self, id: CueId, cue: Cue) {
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(record) => record.cue = cue,
            None => debug!("Ignoring update of unknown cue {}", id),
        }
    }

    /// Remove the cue behind `id`. Unknown ids are a no-op.
    pub fn remove(&mut self, id: CueId) {
        match self.records.iter().position(|record| record.id == id) {
            Some(index) => {
                self.records.remove(index);
            }
            None => debug!("Ignoring removal of unknown cue {}", id),
        }
    }

    // @returns: Cue behind id, if present
    pub fn get(&self, id: CueId) -> Option<&Cue> {
        self.records
            .iter()
            .find(|record| record.id == id)
            .map(|record| &record.cue)
    }

    pub fn contains(&self, id: CueId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &CueRecord> {
        self.records.iter()
    }

    /// Records ordered by start time; ties keep insertion order.
    ///
    /// Recomputed on every call from the current records.
    pub fn sorted_view(&self) -> Vec<&CueRecord> {
        let mut view: Vec<&CueRecord> = self.records.iter().collect();
        view.sort_by_key(|record| record.cue.from);
        view
    }

    /// Records of the sorted view whose range contains `position_ms`
    pub fn active_at(&self, position_ms: u64) -> Vec<&CueRecord> {
        self.sorted_view()
            .into_iter()
            .filter(|record| record.cue.is_active_at(position_ms))
            .collect()
    }

    /// Serialize the sorted view as an SRT document
    pub fn to_srt(&self) -> String {
        SrtCodec::serialize(self.sorted_view().into_iter().map(|record| &record.cue))
    }

    /// Count timing oddities. Nothing is corrected, only reported.
    pub fn summary(&self) -> CollectionSummary {
        let view = self.sorted_view();

        let overlapping = view
            .windows(2)
            .filter(|pair| pair[0].cue.to > pair[1].cue.from)
            .count();

        CollectionSummary {
            cue_count: view.len(),
            first_start_ms: view.first().map(|record| record.cue.from),
            last_end_ms: view.iter().map(|record| record.cue.to).max(),
            overlapping,
            zero_length: view.iter().filter(|record| record.cue.to == record.cue.from).count(),
            reversed: view.iter().filter(|record| record.cue.to < record.cue.from).count(),
        }
    }

    fn allocate_id(&mut self) -> CueId {
        let id = CueId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl fmt::Display for CueCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Cue Collection")?;
        writeln!(f, "Cues: {}", self.records.len())?;
        Ok(())
    }
}
