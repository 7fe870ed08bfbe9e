use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// @module: SRT codec, lenient by contract

// @const: Blank-line block separator, tolerant of both line endings
static BLOCK_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r?\n(?:\r?\n)+").unwrap()
});

// @const: Separator between start and end timestamps
const TIME_RANGE_SEPARATOR: &str = "-->";

// @const: Milliseconds in one day, the wrap point of serialized hours
const MS_PER_DAY: u64 = 86_400_000;

// @struct: Single subtitle cue
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Cue {
    // @field: Start offset in ms
    pub from: u64,

    // @field: End offset in ms, not required to be >= from
    pub to: u64,

    // @field: Raw text, inline markup kept verbatim
    pub text: String,
}

impl Cue {
    /// Creates a new cue
    pub fn new(from: u64, to: u64, text: impl Into<String>) -> Self {
        Cue {
            from,
            to,
            text: text.into(),
        }
    }

    /// True when every field holds its default value.
    ///
    /// Blank cues are what malformed blocks degrade to and are dropped by the parser.
    pub fn is_blank(&self) -> bool {
        self.from == 0 && self.to == 0 && self.text.is_empty()
    }

    // @returns: Whether the playhead falls inside [from, to]
    pub fn is_active_at(&self, position_ms: u64) -> bool {
        self.from <= position_ms && self.to >= position_ms
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds.
    ///
    /// Never fails: each component is read up to its first non-digit, and a
    /// missing or non-numeric component counts as zero.
    pub fn parse_timestamp(timestamp: &str) -> u64 {
        let parts: Vec<&str> = timestamp.split(':').collect();

        let hours = parse_component(parts.first().copied());
        let minutes = parse_component(parts.get(1).copied());

        let (seconds, millis) = match parts.get(2) {
            Some(sec_and_ms) => {
                let mut sec_parts = sec_and_ms.split(',');
                (
                    parse_component(sec_parts.next()),
                    parse_component(sec_parts.next()),
                )
            }
            None => (0, 0),
        };

        hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(seconds)
            .saturating_mul(1000)
            .saturating_add(millis)
    }

    /// Format milliseconds as an SRT timestamp (`HH:MM:SS,mmm`).
    ///
    /// The hour field wraps at 24, so anything from one day on loses whole days.
    pub fn format_timestamp(ms: u64) -> String {
        let ms = ms % MS_PER_DAY;
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_from(&self) -> String {
        Self::format_timestamp(self.from)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_to(&self) -> String {
        Self::format_timestamp(self.to)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} --> {} {:?}", self.format_from(), self.format_to(), self.text)
    }
}

// @parses: Leading digits of a component, anything after them is ignored
fn parse_component(component: Option<&str>) -> u64 {
    component
        .map(|value| {
            let value = value.trim_start();
            let end = value
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(value.len());
            value[..end].parse().unwrap_or(0)
        })
        .unwrap_or(0)
}

/// Reader and writer for the SRT interchange format.
///
/// Both directions are total: `parse` accepts any input and degrades malformed
/// pieces to zero/empty values instead of reporting errors, and `serialize`
/// accepts any cue values.
pub struct SrtCodec;

impl SrtCodec {
    /// Parse an SRT document into cues, in document order.
    ///
    /// The index line of each block is ignored. A block without a usable
    /// `start --> end` line keeps its text with both times at zero. Blocks
    /// that end up entirely blank are dropped.
    pub fn parse(document: &str) -> Vec<Cue> {
        BLOCK_SEPARATOR_REGEX
            .split(document.trim())
            .map(Self::parse_block)
            .filter(|cue| !cue.is_blank())
            .collect()
    }

    /// Serialize cues in the order given, numbering blocks from 1.
    pub fn serialize<'a, I>(cues: I) -> String
    where
        I: IntoIterator<Item = &'a Cue>,
    {
        cues.into_iter()
            .enumerate()
            .map(|(i, cue)| {
                format!(
                    "{}\n{} --> {}\n{}\n",
                    i + 1,
                    cue.format_from(),
                    cue.format_to(),
                    cue.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    // @parses: One block, first line ignored
    fn parse_block(block: &str) -> Cue {
        let lines: Vec<&str> = block.lines().collect();

        let time_line = lines.get(1).copied().unwrap_or("");
        let (from, to) = Self::parse_time_range(time_line);
        let text = lines.get(2..).map(|rest| rest.join("\n")).unwrap_or_default();

        Cue { from, to, text }
    }

    /// Parse a `start --> end` line; anything else yields `(0, 0)`.
    pub fn parse_time_range(line: &str) -> (u64, u64) {
        let parts: Vec<&str> = line.split(TIME_RANGE_SEPARATOR).collect();
        if parts.len() != 2 {
            return (0, 0);
        }

        (
            Cue::parse_timestamp(parts[0].trim()),
            Cue::parse_timestamp(parts[1].trim()),
        )
    }
}
