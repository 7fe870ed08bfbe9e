/*!
 * Tests for editor session operations
 */

use subsedit::app_config::EditorConfig;
use subsedit::editor::{format_clock, seconds_to_ms, CueEdge, EditorSession};
use subsedit::subtitle_codec::Cue;
use crate::common;

fn session_with(document: &str) -> EditorSession {
    let mut session = EditorSession::new(EditorConfig::default());
    session.load_document(document);
    session
}

#[test]
fn test_new_session_withDefaults_shouldStartEmpty() {
    let session = EditorSession::new(EditorConfig::default());

    assert!(session.cues().is_empty());
    assert_eq!(session.position_ms(), 0);
    assert_eq!(session.duration_ms(), 30_000);
    assert_eq!(session.title(), "SubsEdit");
    assert!(session.document_path().is_none());
}

/// Player seconds become rounded milliseconds
#[test]
fn test_update_position_withFractionalSeconds_shouldRoundToMs() {
    let mut session = EditorSession::new(EditorConfig::default());

    session.update_position(12.3456);
    session.update_duration(95.5);

    assert_eq!(session.position_ms(), 12_346);
    assert_eq!(session.duration_ms(), 95_500);
}

#[test]
fn test_seconds_to_ms_withInvalidInput_shouldClampToZero() {
    assert_eq!(seconds_to_ms(-1.0), 0);
    assert_eq!(seconds_to_ms(f64::NAN), 0);
    assert_eq!(seconds_to_ms(f64::INFINITY), 0);
}

/// A new cue sits at the playhead with the configured text
#[test]
fn test_add_cue_at_position_withPlayhead_shouldCreateZeroLengthCue() {
    let mut session = EditorSession::new(EditorConfig::default());
    session.update_position(4.2);

    let id = session.add_cue_at_position();

    assert_eq!(session.cues().get(id), Some(&Cue::new(4_200, 4_200, "New subtitle!")));
}

#[test]
fn test_nudge_withSteps_shouldMoveByConfiguredStep() {
    let mut session = session_with("1\n00:00:01,000 --> 00:00:02,000\nA");
    let id = session.cue_id_at(1).expect("cue should exist");

    session.nudge(id, CueEdge::Start, 1);
    session.nudge(id, CueEdge::End, -3);

    assert_eq!(session.cues().get(id), Some(&Cue::new(1_100, 1_700, "A")));
}

/// Nudging below zero stops at zero
#[test]
fn test_nudge_belowZero_shouldSaturate() {
    let mut session = session_with("1\n00:00:00,050 --> 00:00:00,080\nA");
    let id = session.cue_id_at(1).expect("cue should exist");

    session.nudge(id, CueEdge::Start, -1);

    assert_eq!(session.cues().get(id).map(|cue| cue.from), Some(0));
}

#[test]
fn test_set_edge_to_position_withPlayhead_shouldSnapEdge() {
    let mut session = session_with("1\n00:00:01,000 --> 00:00:02,000\nA");
    let id = session.cue_id_at(1).expect("cue should exist");
    session.update_position(7.0);

    session.set_edge_to_position(id, CueEdge::End);

    assert_eq!(session.cues().get(id), Some(&Cue::new(1_000, 7_000, "A")));
}

/// Edits are allowed to make a cue end before it starts
#[test]
fn test_set_edge_withReversingValue_shouldNotValidate() {
    let mut session = session_with("1\n00:00:05,000 --> 00:00:06,000\nA");
    let id = session.cue_id_at(1).expect("cue should exist");

    session.set_edge(id, CueEdge::End, 1_000);

    assert_eq!(session.cues().get(id), Some(&Cue::new(5_000, 1_000, "A")));
}

#[test]
fn test_set_text_withMultiline_shouldReplaceTextOnly() {
    let mut session = session_with("1\n00:00:01,000 --> 00:00:02,000\nA");
    let id = session.cue_id_at(1).expect("cue should exist");

    session.set_text(id, "<b>B</b>\nsecond");

    assert_eq!(session.cues().get(id), Some(&Cue::new(1_000, 2_000, "<b>B</b>\nsecond")));
}

/// Positions follow the sorted view, not insertion order
#[test]
fn test_cue_id_at_withUnsortedDocument_shouldUseSortedPositions() {
    let session = session_with(common::UNSORTED_SRT);

    let first = session.cue_id_at(1).and_then(|id| session.cues().get(id));
    assert_eq!(first.map(|cue| cue.from), Some(1_000));
    assert!(session.cue_id_at(0).is_none());
    assert!(session.cue_id_at(4).is_none());
    assert!(session.require_cue_at(4).is_err());
}

#[test]
fn test_delete_withKnownCue_shouldRemoveIt() {
    let mut session = session_with(common::UNSORTED_SRT);
    let id = session.cue_id_at(2).expect("cue should exist");

    session.delete(id);

    assert_eq!(session.cues().len(), 2);
    assert!(!session.cues().contains(id));
}

/// Operations on a deleted cue are ignored
#[test]
fn test_edits_withStaleId_shouldBeIgnored() {
    let mut session = session_with(common::UNSORTED_SRT);
    let id = session.cue_id_at(1).expect("cue should exist");
    session.delete(id);
    let before = session.render_document();

    session.nudge(id, CueEdge::Start, 5);
    session.set_text(id, "ghost");
    session.set_edge_to_position(id, CueEdge::End);

    assert_eq!(session.render_document(), before);
    assert!(session.seek_target(id, CueEdge::Start).is_none());
}

#[test]
fn test_seek_target_withCue_shouldReturnSeconds() {
    let session = session_with("1\n00:01:02,500 --> 00:01:04,250\nA");
    let id = session.cue_id_at(1).expect("cue should exist");

    assert_eq!(session.seek_target(id, CueEdge::Start), Some(62.5));
    assert_eq!(session.seek_target(id, CueEdge::End), Some(64.25));
}

#[test]
fn test_active_cues_withPlayheadInside_shouldMatchInclusiveRange() {
    let mut session = session_with(common::UNSORTED_SRT);

    session.update_position(4.0);
    assert_eq!(session.active_cues().len(), 1);

    session.update_position(4.5);
    assert!(session.active_cues().is_empty());
}

/// New document clears cues but keeps the save target
#[test]
fn test_new_document_withOpenPath_shouldClearCuesAndKeepPath() {
    let mut session = session_with(common::UNSORTED_SRT);
    session.set_document_path("/tmp/out.srt");

    session.new_document();

    assert!(session.cues().is_empty());
    assert!(session.document_path().is_some());
}

/// Reloading retires handles from the previous document
#[test]
fn test_load_document_afterEdits_shouldNotReuseIds() {
    let mut session = session_with(common::UNSORTED_SRT);
    let old = session.cue_id_at(1).expect("cue should exist");

    session.load_document(common::UNSORTED_SRT);

    assert!(!session.cues().contains(old));
    assert_eq!(session.cues().len(), 3);
}

#[test]
fn test_save_withoutPath_shouldFail() {
    let session = session_with(common::UNSORTED_SRT);

    assert!(session.save().is_err());
}

#[test]
fn test_format_clock_withAndWithoutHours_shouldPickLayout() {
    assert_eq!(format_clock(0), "0:00.000");
    assert_eq!(format_clock(61_234), "1:01.234");
    assert_eq!(format_clock(3_723_004), "1:02:03.004");
}

#[test]
fn test_clock_withPositionAndDuration_shouldShowBoth() {
    let mut session = EditorSession::new(EditorConfig::default());
    session.update_position(1.5);

    assert_eq!(session.clock(), "0:01.500 / 0:30.000");
}

#[test]
fn test_cue_edge_from_str_withAliases_shouldParse() {
    assert_eq!("start".parse::<CueEdge>(), Ok(CueEdge::Start));
    assert_eq!("TO".parse::<CueEdge>(), Ok(CueEdge::End));
    assert!("middle".parse::<CueEdge>().is_err());
}
