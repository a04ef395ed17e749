/*!
 * Tests for line classification
 */

use subconv::parsing::{classify, LineClassifier, LineParts, LineShape};

fn shape_of(line: &str) -> LineShape {
    LineClassifier::default().classify(line).shape
}

/// Test that a clock time inside a sentence stays text
#[test]
fn test_classify_withTimestampMidSentence_shouldReturnTextOnly() {
    assert_eq!(
        classify("The sun rises at 6:03 a.m."),
        LineParts {
            start: None,
            end: None,
            text: "The sun rises at 6:03 a.m.".to_string(),
        }
    );
}

/// Test every arrow spelling
#[test]
fn test_classify_withArrowVariants_shouldReadBothTimes() {
    for line in [
        "00:00:01 --> 00:00:02",
        "00:00:01->00:00:02",
        "00:00:01 -- 00:00:02",
        "00:00:01 => 00:00:02",
        "00:00:01 – 00:00:02",
        "00:00:01—00:00:02",
    ] {
        let parts = classify(line);
        assert_eq!((parts.start, parts.end), (Some(1.0), Some(2.0)), "line {:?}", line);
    }
}

/// Test the shape priority order
#[test]
fn test_classify_shapes_shouldFollowPriority() {
    assert_eq!(shape_of(""), LineShape::Blank);
    assert_eq!(shape_of("42"), LineShape::Index);
    assert_eq!(shape_of("00:00:01,000 --> 00:00:02,000"), LineShape::Range);
    assert_eq!(shape_of("00:00:2 -->"), LineShape::OpenRange);
    assert_eq!(shape_of("00:00:01 Hello"), LineShape::StartWithText);
    assert_eq!(shape_of("01:23"), LineShape::StartOnly);
    assert_eq!(shape_of("10,000 rounds of ammunition"), LineShape::Text);
    assert_eq!(shape_of("103.06 meters"), LineShape::Text);
}

/// Test tolerated decorations around timestamps
#[test]
fn test_classify_withDecoratedTokens_shouldStillRecognize() {
    assert_eq!(classify("[00:05] Hello").start, Some(5.0));
    assert_eq!(classify("(00:00:07)").start, Some(7.0));
    assert_eq!(classify("00:10.000--> 00:11.900:").end, Some(11.9));
}

/// Test that a byte order mark does not hide a timestamp
#[test]
fn test_classify_withByteOrderMark_shouldIgnoreIt() {
    assert_eq!(shape_of("\u{feff}1"), LineShape::Index);
    assert_eq!(classify("\u{feff}00:00:03 a").start, Some(3.0));
}

/// Test that the literal tokens are kept for error messages
#[test]
fn test_classify_shouldKeepLiteralTokens() {
    let line = LineClassifier::default().classify("  0:00:05-->0:00:06 text ");

    assert_eq!(line.raw, "0:00:05-->0:00:06 text");
    assert_eq!(line.start_text.as_deref(), Some("0:00:05"));
    assert_eq!(line.end_text.as_deref(), Some("0:00:06"));
    assert_eq!(line.parts.text, "text");
}
