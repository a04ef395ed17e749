/*!
 * End-to-end conversion tests
 */

use anyhow::Result;
use std::fs;
use subconv::app_config::{ColonFraction, Config};
use subconv::app_controller::Controller;
use subconv::caption::CaptionBlock;
use subconv::formats::SubtitleFormat;
use subconv::subtitle_processor::SubtitleCollection;
use crate::common;

/// Test SRT to CSV to TXT and back to SRT
#[test]
fn test_conversionChain_shouldPreserveText() -> Result<()> {
    common::init_test_logging();

    let srt = SubtitleCollection::parse(common::SAMPLE_SRT)?;
    let csv = SubtitleCollection::parse(&srt.to_format(SubtitleFormat::Csv)?)?;

    assert_eq!(csv.source_format(), Some(SubtitleFormat::Csv));
    assert_eq!(csv.len(), srt.len());
    for (a, b) in srt.entries().iter().zip(csv.entries()) {
        assert_eq!(a.start, b.start);
        assert_eq!(a.end, b.end);
        assert_eq!(a.joined_text(), b.joined_text());
    }

    let txt = csv.to_format(SubtitleFormat::Txt)?;
    assert_eq!(
        txt,
        "Senator, we're making our final approach into Coruscant.\nVery good, Lieutenant.\n"
    );

    let back = SubtitleCollection::parse(&txt)?;
    assert_eq!(back.entries()[1].start, 1.0);
    Ok(())
}

/// Test that strict encode and decode agree for validated captions
#[test]
fn test_srtRoundTrip_forAwkwardTimes_shouldBeExact() -> Result<()> {
    let content = "1\n00:00:00,001 --> 00:00:00,010\na\n\n2\n00:00:00,100 --> 00:00:59,999\nb\nc\n\n\
                   3\n99:59:59,000 --> 100:00:00,000\nd\n";

    let first = SubtitleCollection::parse(content)?;
    let second = SubtitleCollection::parse(&first.to_format(SubtitleFormat::Srt)?)?;

    assert_eq!(first.entries(), second.entries());
    assert_eq!(first.to_format(SubtitleFormat::Srt)?, second.to_format(SubtitleFormat::Srt)?);
    Ok(())
}

/// Test that padded caption text is normalized so SRT reproduces it exactly
#[test]
fn test_srtRoundTrip_withPaddedText_shouldBeExact() -> Result<()> {
    let collection = SubtitleCollection::from_blocks(vec![CaptionBlock::new(1.0, 2.0, ["  leading", "trailing  "])])?;

    let reparsed = SubtitleCollection::parse(&collection.to_format(SubtitleFormat::Srt)?)?;

    assert_eq!(collection.entries()[0].lines, vec!["leading", "trailing"]);
    assert_eq!(reparsed.entries(), collection.entries());
    Ok(())
}

/// Test a transcript with frame-based times through the whole application
#[test]
fn test_controller_withDecimalColonFraction_shouldApplyConfig() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(dir.path(), "frames.txt", "00:00:01:50 a\n00:00:02:00 b\n")?;

    let mut config = Config::default();
    config.timing.colon_fraction = ColonFraction::Decimal;
    config.output.default_format = SubtitleFormat::Csv;
    Controller::with_config(config)?.run(&input, None, None, None, false)?;

    let written = fs::read_to_string(dir.path().join("frames.csv"))?;
    assert_eq!(written, "Start,End,Text\n1.5,2,a\n2,3,b\n");
    Ok(())
}

/// Test that an out-of-range frame count is not a timestamp under the default config
#[test]
fn test_defaultConfig_withOutOfRangeFrames_shouldIgnoreLine() -> Result<()> {
    let collection = SubtitleCollection::parse("00:00:01:50 a\n00:00:02:00 b\n")?;

    assert_eq!(collection.len(), 1);
    assert_eq!(collection.entries()[0].start, 2.0);
    assert_eq!(collection.entries()[0].lines, vec!["b".to_string()]);
    Ok(())
}

/// Test SRT to DFXP and back through the facade
#[test]
fn test_srtToDfxp_andBack_shouldKeepCaptions() -> Result<()> {
    let srt = SubtitleCollection::parse(common::SAMPLE_SRT)?;

    let dfxp = srt.to_format(SubtitleFormat::Dfxp)?;
    let reparsed = SubtitleCollection::parse(&dfxp)?;

    assert_eq!(reparsed.source_format(), Some(SubtitleFormat::Dfxp));
    assert_eq!(reparsed.entries(), srt.entries());
    Ok(())
}

/// Test that a DFXP file is found and converted by the controller
#[test]
fn test_controller_withDfxpInput_shouldWriteSrt() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        dir.path(),
        "talk.ttml",
        "<tt xmlns=\"http://www.w3.org/ns/ttml\"><body><div>\n\
         <p begin=\"00:00:01.000\" end=\"00:00:02.000\">one<br/>two</p>\n\
         </div></body></tt>\n",
    )?;

    Controller::with_config(Config::default())?.run(&input, None, Some(SubtitleFormat::Srt), None, false)?;

    let written = fs::read_to_string(dir.path().join("talk.srt"))?;
    assert_eq!(written, "1\n00:00:01,000 --> 00:00:02,000\none\ntwo\n\n");
    Ok(())
}

/// Test that SRT formatting tags do not reach the captions
#[test]
fn test_parse_withSrtTags_shouldKeepPlainText() -> Result<()> {
    let content = "1\n00:00:01,000-->00:00:02,000\n<font color=\"#rrggbb\">one</font>\n\n\
                   2\n00:00:02.000-->00:00:03.000\n<i>two</i>\n";

    let collection = SubtitleCollection::parse(content)?;

    assert_eq!(
        collection.entries(),
        &[CaptionBlock::new(1.0, 2.0, ["one"]), CaptionBlock::new(2.0, 3.0, ["two"])]
    );
    Ok(())
}

/// Test that a timing line without a start is reported as written
#[test]
fn test_parseAs_withBrokenSrtTiming_shouldQuoteLine() {
    let content = "\n00:09:01,866\n\n--> 00:09:06,100\nTHEN, WHEN I LISTENED, HE WAS SAYING ENGLISH\n";

    let err = SubtitleCollection::parse_as(content, SubtitleFormat::Srt).unwrap_err();

    assert!(err.to_string().contains("--> 00:09:06,100"), "{}", err);
}
