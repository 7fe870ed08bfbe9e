/*!
 * Tests for SRT parsing and serialization
 */

use subsedit::subtitle_codec::{Cue, SrtCodec};

/// Test timestamp parsing of a regular value
#[test]
fn test_parse_timestamp_withValidTimestamp_shouldReturnMilliseconds() {
    assert_eq!(Cue::parse_timestamp("00:06:35,200"), 395_200);
    assert_eq!(Cue::parse_timestamp("01:23:45,678"), 5_025_678);
}

/// Test that garbage components count as zero instead of failing
#[test]
fn test_parse_timestamp_withGarbageComponents_shouldTreatThemAsZero() {
    assert_eq!(Cue::parse_timestamp("xx:01:02,003"), 62_003);
    assert_eq!(Cue::parse_timestamp("00:01:xx,500"), 60_500);
    assert_eq!(Cue::parse_timestamp("00:00:02"), 2_000);
    assert_eq!(Cue::parse_timestamp("garbage"), 0);
}

/// Components are read up to their first non-digit
#[test]
fn test_parse_timestamp_withTrailingCharacters_shouldUseLeadingDigits() {
    assert_eq!(Cue::parse_timestamp("00:00:01.500"), 1_000);
    assert_eq!(Cue::parse_timestamp("00:00:03,200 X1"), 3_200);
    assert_eq!(Cue::parse_timestamp(" 01:02:03,004ms"), 3_723_004);
}

/// Position coordinates after the end time do not disturb it
#[test]
fn test_parse_withCoordinatesAfterEndTime_shouldKeepMilliseconds() {
    let cues = SrtCodec::parse("1\n00:00:01,600 --> 00:00:03,200 X1:40 X2:600 Y1:20 Y2:50\nHi");

    assert_eq!(cues, vec![Cue::new(1_600, 3_200, "Hi")]);
}

/// Test timestamp formatting with padding
#[test]
fn test_format_timestamp_withValue_shouldZeroPad() {
    assert_eq!(Cue::format_timestamp(0), "00:00:00,000");
    assert_eq!(Cue::format_timestamp(5_025_678), "01:23:45,678");
    assert_eq!(Cue::format_timestamp(61_234), "00:01:01,234");
}

/// Values past one day wrap the hour field, this is the documented behavior
#[test]
fn test_format_timestamp_withMoreThanADay_shouldWrapHours() {
    assert_eq!(Cue::format_timestamp(90_000_000), "01:00:00,000");

    let cue = Cue::new(90_000_000, 90_000_500, "late");
    let output = SrtCodec::serialize([&cue]);
    assert!(output.contains("01:00:00,000 --> 01:00:00,500"));

    let reparsed = SrtCodec::parse(&output);
    assert_eq!(reparsed[0].from, 3_600_000);
}

/// Test parsing a regular document
#[test]
fn test_parse_withValidContent_shouldParseInDocumentOrder() {
    let content = "1\n00:00:05,000 --> 00:00:08,000\nSecond\n\n2\n00:00:01,000 --> 00:00:04,000\nFirst\nline two\n";

    let cues = SrtCodec::parse(content);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0], Cue::new(5_000, 8_000, "Second"));
    assert_eq!(cues[1], Cue::new(1_000, 4_000, "First\nline two"));
}

/// Test CRLF line endings and extra blank lines between blocks
#[test]
fn test_parse_withCrlfAndExtraBlankLines_shouldSplitBlocks() {
    let content = "\r\n1\r\n00:00:01,000 --> 00:00:02,000\r\nA\r\n\r\n\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nB\r\n\r\n";

    let cues = SrtCodec::parse(content);

    assert_eq!(cues, vec![Cue::new(1_000, 2_000, "A"), Cue::new(3_000, 4_000, "B")]);
}

/// A block with an unusable time line keeps its text
#[test]
fn test_parse_withMalformedTimeLine_shouldKeepTextWithZeroTimes() {
    let cues = SrtCodec::parse("1\ngarbage\nHello");

    assert_eq!(cues, vec![Cue::new(0, 0, "Hello")]);
}

/// Too many separators also counts as malformed
#[test]
fn test_parse_withTwoArrows_shouldZeroBothTimes() {
    let cues = SrtCodec::parse("1\n00:00:01,000 --> 00:00:02,000 --> 00:00:03,000\nText");

    assert_eq!(cues, vec![Cue::new(0, 0, "Text")]);
}

/// A block with times but no text is kept
#[test]
fn test_parse_withTimesButNoText_shouldKeepCue() {
    let cues = SrtCodec::parse("1\n00:00:01,000 --> 00:00:02,000");

    assert_eq!(cues, vec![Cue::new(1_000, 2_000, "")]);
}

/// Blank cues never come out of the parser
#[test]
fn test_parse_withDegenerateBlocks_shouldDropThem() {
    let content = "1\n\n2\ngarbage\n\n3\n00:00:00,000 --> 00:00:00,000\n\n4\n00:00:01,000 --> 00:00:02,000\nKept";

    let cues = SrtCodec::parse(content);

    assert_eq!(cues, vec![Cue::new(1_000, 2_000, "Kept")]);
    assert!(cues.iter().all(|cue| !cue.is_blank()));
}

/// Empty and whitespace-only input parse to nothing
#[test]
fn test_parse_withEmptyInput_shouldReturnNoCues() {
    assert!(SrtCodec::parse("").is_empty());
    assert!(SrtCodec::parse("  \n\r\n  ").is_empty());
}

/// Inline markup survives untouched
#[test]
fn test_parse_withMarkup_shouldPreserveItVerbatim() {
    let cues = SrtCodec::parse("1\n00:00:01,000 --> 00:00:02,000\n<i>Hi</i> <b>there</b>");

    assert_eq!(cues[0].text, "<i>Hi</i> <b>there</b>");
}

/// Test the exact serialized layout
#[test]
fn test_serialize_withTwoCues_shouldProduceSrtLayout() {
    let cues = vec![Cue::new(1_000, 2_500, "One"), Cue::new(3_000, 4_000, "Two\nlines")];

    let output = SrtCodec::serialize(&cues);

    assert_eq!(
        output,
        "1\n00:00:01,000 --> 00:00:02,500\nOne\n\n2\n00:00:03,000 --> 00:00:04,000\nTwo\nlines\n"
    );
}

/// Serialize keeps the given order and numbers sequentially
#[test]
fn test_serialize_withUnsortedInput_shouldKeepGivenOrder() {
    let cues = vec![Cue::new(9_000, 9_500, "Late"), Cue::new(1_000, 1_500, "Early")];

    let output = SrtCodec::serialize(&cues);

    assert!(output.starts_with("1\n00:00:09,000"));
    assert!(output.contains("2\n00:00:01,000"));
}

#[test]
fn test_serialize_withNoCues_shouldReturnEmptyString() {
    assert_eq!(SrtCodec::serialize(&Vec::<Cue>::new()), "");
}

/// parse(serialize(cues)) gives the cues back
#[test]
fn test_round_trip_withVariedCues_shouldPreserveValues() {
    let cues = vec![
        Cue::new(0, 1, "a"),
        Cue::new(500, 400, "reversed"),
        Cue::new(1_000, 1_000, ""),
        Cue::new(3_599_999, 3_600_000, "<i>multi</i>\nline"),
        Cue::new(86_399_999, 86_399_999, "last millisecond of the day"),
    ];

    let reparsed = SrtCodec::parse(&SrtCodec::serialize(&cues));

    assert_eq!(reparsed, cues);
}

#[test]
fn test_is_active_at_withBoundaries_shouldIncludeBothEnds() {
    let cue = Cue::new(1_000, 2_000, "x");

    assert!(cue.is_active_at(1_000));
    assert!(cue.is_active_at(2_000));
    assert!(!cue.is_active_at(999));
    assert!(!cue.is_active_at(2_001));
}
