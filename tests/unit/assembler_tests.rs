/*!
 * Tests for block assembly
 */

use subconv::caption::CaptionBlock;
use subconv::consistency::reconcile;
use subconv::parsing::{assemble, BlockAssembler, TimingConvention};

fn assemble_text(content: &str) -> Vec<CaptionBlock> {
    reconcile(assemble(content.lines())).unwrap()
}

/// Test the single-timestamp convention with ends taken from the next start
#[test]
fn test_assemble_withStartOnlyLines_shouldDefaultLastEnd() {
    let blocks = reconcile(assemble(["00:00:01", "One", "", "00:00:02", "Two"])).unwrap();

    assert_eq!(
        blocks,
        vec![CaptionBlock::new(1.0, 2.0, ["One"]), CaptionBlock::new(2.0, 3.0, ["Two"])]
    );
}

/// Test timestamps followed by text on the same line
#[test]
fn test_assemble_withTimestampAndTextOnSameLine_shouldSplit() {
    let blocks = assemble_text(
        "00:00:00 Senator, we're making our final approach into Coruscant.\n00:00:01 Very good, Lieutenant.",
    );

    assert_eq!(
        blocks,
        vec![
            CaptionBlock::new(0.0, 1.0, ["Senator, we're making our final approach into Coruscant."]),
            CaptionBlock::new(1.0, 2.0, ["Very good, Lieutenant."]),
        ]
    );
}

/// Test minute:second timestamps on their own line with trailing spaces
#[test]
fn test_assemble_withTimestampOnSeparateLine_shouldAttachFollowingText() {
    let blocks = assemble_text("00:00 \nSenator.\n00:01 \nVery good.");

    assert_eq!(
        blocks,
        vec![CaptionBlock::new(0.0, 1.0, ["Senator."]), CaptionBlock::new(1.0, 2.0, ["Very good."])]
    );
}

/// Test open ranges with missing ends
#[test]
fn test_assemble_withIncompleteRanges_shouldInferEnds() {
    let blocks = assemble_text("1\n00:00:01 -->\na\nb\n\n2\n00:00:2 -->\nc\n");

    assert_eq!(
        blocks,
        vec![CaptionBlock::new(1.0, 2.0, ["a", "b"]), CaptionBlock::new(2.0, 3.0, ["c"])]
    );
}

/// Test that extra blank lines do not split blocks
#[test]
fn test_assemble_withExcessiveBlankLines_shouldKeepBlocksTogether() {
    let blocks = assemble_text("1\n\n00:00:01 --> 00:00:02\n\na\n\nb\n\n\n2\n\n00:00:3 --> 00:00:4\n\nc\n");

    assert_eq!(
        blocks,
        vec![CaptionBlock::new(1.0, 2.0, ["a", "b"]), CaptionBlock::new(3.0, 4.0, ["c"])]
    );
}

/// Test each timestamp family as a caption start
#[test]
fn test_assemble_withTimestampFamilies_shouldStartCaptions() {
    let cases = [
        ("\n01:23\na\n", 83.0),
        ("\n01:23:46\nb\n", 5026.0),
        ("\n01:23:47,001\nc\n", 5027.001),
        ("\n01:23:48.2\nd\n", 5028.2),
        ("\n01:23:49:20\ne\n", 5029.8),
        ("\n5050.81\nf\n", 5050.81),
    ];

    for (content, start) in cases {
        let blocks = assemble_text(content);
        assert_eq!(blocks.len(), 1, "content {:?}", content);
        assert_eq!(blocks[0].start, start, "content {:?}", content);
        assert_eq!(blocks[0].end, start + 1.0, "content {:?}", content);
    }
}

/// Test a range with trailing punctuation where index lines follow the text
#[test]
fn test_assemble_withTrailingIndexLines_shouldDropThem() {
    let blocks = assemble_text("1\n00:10.000--> 00:11.900:\nOne\n1\n\n2\n00:12.000--> 00:12.900:\nTwo\n2 ");

    assert_eq!(
        blocks,
        vec![CaptionBlock::new(10.0, 11.9, ["One"]), CaptionBlock::new(12.0, 12.9, ["Two"])]
    );
}

/// Test that a timestamp at the end of a line is text
#[test]
fn test_assemble_withTimestampAtLineEnd_shouldStayUntimed() {
    let blocks = assemble_text("\n            a\n            b 00:00\n        ");

    assert_eq!(
        blocks,
        vec![CaptionBlock::new(0.0, 1.0, ["a"]), CaptionBlock::new(1.0, 2.0, ["b 00:00"])]
    );
}

/// Test that text before the first timestamp is dropped
#[test]
fn test_assemble_withTextBeforeFirstTimestamp_shouldDropIt() {
    let blocks = assemble_text("\n            a\n            00:03 b \n        ");

    assert_eq!(blocks, vec![CaptionBlock::new(3.0, 4.0, ["b"])]);
}

/// Test that number-like text does not make a file timed
#[test]
fn test_assemble_withoutTimestamps_shouldNumberLines() {
    let assembly = BlockAssembler::default().assemble("\na\nb\nc\nd\ne\n10,000 rounds of ammunition\n        ".lines());

    assert_eq!(assembly.convention, TimingConvention::Untimed);
    let expected: Vec<CaptionBlock> = ["a", "b", "c", "d", "e", "10,000 rounds of ammunition"]
        .iter()
        .enumerate()
        .map(|(i, text)| CaptionBlock::new(i as f64, i as f64 + 1.0, [*text]))
        .collect();
    assert_eq!(assembly.blocks, expected);
}

/// Test that adjacent lines form one caption when blank lines separate paragraphs
#[test]
fn test_assemble_withParagraphs_shouldKeepLinesTogether() {
    let blocks = assemble_text("\na\nb\n\nc\n\nd\ne\n        ");

    assert_eq!(
        blocks,
        vec![
            CaptionBlock::new(0.0, 1.0, ["a", "b"]),
            CaptionBlock::new(1.0, 2.0, ["c"]),
            CaptionBlock::new(2.0, 3.0, ["d", "e"]),
        ]
    );
}

/// Test that a decimal number at the start of a caption line is text
#[test]
fn test_assemble_withNumberLikeText_shouldAppendToCaption() {
    let blocks = assemble_text("\n23:19\na\n23:25\n103.06 meters\n23:29\nc\n        ");

    assert_eq!(
        blocks,
        vec![
            CaptionBlock::new(1399.0, 1405.0, ["a"]),
            CaptionBlock::new(1405.0, 1409.0, ["103.06 meters"]),
            CaptionBlock::new(1409.0, 1410.0, ["c"]),
        ]
    );
}

/// Test that the convention is reported once for the whole input
#[test]
fn test_assemble_shouldReportConvention() {
    let assembler = BlockAssembler::default();

    assert_eq!(
        assembler.assemble(["00:00:01 --> 00:00:02", "a"]).convention,
        TimingConvention::StartEnd
    );
    assert_eq!(assembler.assemble(["00:01 a", "00:02 b"]).convention, TimingConvention::StartOnly);
    assert_eq!(assembler.assemble(["a", "b"]).convention, TimingConvention::Untimed);
}
