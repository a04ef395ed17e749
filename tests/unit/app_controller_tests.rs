/*!
 * Tests for the application controller
 */

use anyhow::Result;
use std::fs;
use subconv::app_config::Config;
use subconv::app_controller::{ConversionOutcome, Controller, FolderSummary};
use subconv::formats::SubtitleFormat;
use crate::common;

fn controller() -> Controller {
    Controller::with_config(Config::default()).unwrap()
}

/// Test that an invalid configuration is refused
#[test]
fn test_withConfig_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.timing.frame_rate = -1.0;

    assert!(Controller::with_config(config).is_err());
}

/// Test converting next to the input with the default format
#[test]
fn test_run_withoutOutput_shouldWriteNextToInput() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(dir.path(), "talk.txt", common::SAMPLE_TXT)?;

    let outcome = controller().run(&input, None, None, None, false)?;

    let expected = dir.path().join("talk.srt");
    assert_eq!(outcome, ConversionOutcome::Converted(expected.clone()));
    let written = fs::read_to_string(expected)?;
    assert!(written.starts_with("1\n00:00:00,000 --> 00:00:01,000\n"), "{}", written);
    Ok(())
}

/// Test an explicit output file and target format
#[test]
fn test_run_withOutputFile_shouldUseIt() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(dir.path(), "movie.srt")?;
    let output = dir.path().join("export").join("movie.csv");

    controller().run(&input, Some(&output), Some(SubtitleFormat::Csv), None, false)?;

    assert_eq!(fs::read_to_string(output)?, common::SAMPLE_CSV);
    Ok(())
}

/// Test that existing outputs are kept unless forced
#[test]
fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(dir.path(), "movie.srt")?;
    let existing = common::create_test_file(dir.path(), "movie.txt", "keep me")?;

    let outcome = controller().run(&input, None, Some(SubtitleFormat::Txt), None, false)?;
    assert_eq!(outcome, ConversionOutcome::Skipped(existing.clone()));
    assert_eq!(fs::read_to_string(&existing)?, "keep me");

    controller().run(&input, None, Some(SubtitleFormat::Txt), None, true)?;
    assert!(fs::read_to_string(&existing)?.starts_with("Senator"));
    Ok(())
}

/// Test that a timing error leaves no output behind
#[test]
fn test_run_withTimingError_shouldNotWriteOutput() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_file(dir.path(), "bad.srt", "1\n00:00:00,000 --> 00:05:01,000\na\n")?;

    assert!(controller().run(&input, None, Some(SubtitleFormat::Txt), None, false).is_err());
    assert!(!dir.path().join("bad.txt").exists());
    Ok(())
}

/// Test a missing input file
#[test]
fn test_run_withMissingInput_shouldFail() {
    let result = controller().run(std::path::Path::new("/no/such/file.srt"), None, None, None, false);

    assert!(result.is_err());
}

/// Test folder conversion counts
#[test]
fn test_runFolder_shouldConvertAndCount() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(dir.path(), "a.txt", common::SAMPLE_TXT)?;
    common::create_test_file(dir.path(), "nested/b.csv", common::SAMPLE_CSV)?;
    common::create_test_file(dir.path(), "c.txt", "1\n00:00:02,000 --> 00:00:01,000\nbad\n")?;
    common::create_test_subtitle(dir.path(), "already.srt")?;

    let summary = controller().run_folder(dir.path(), None, Some(SubtitleFormat::Srt), false)?;

    assert_eq!(summary, FolderSummary { converted: 2, skipped: 0, failed: 1 });
    assert!(dir.path().join("a.srt").exists());
    assert!(dir.path().join("nested").join("b.srt").exists());
    assert!(!dir.path().join("already.converted.srt").exists());
    Ok(())
}

/// Test folder conversion into a separate tree
#[test]
fn test_runFolder_withOutputDir_shouldMirrorTree() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    common::create_test_file(&input_dir, "nested/b.csv", common::SAMPLE_CSV)?;

    let summary = controller().run_folder(&input_dir, Some(&output_dir), Some(SubtitleFormat::Txt), false)?;

    assert_eq!(summary.converted, 1);
    assert!(output_dir.join("nested").join("b.txt").exists());
    Ok(())
}

/// Test inspecting a file
#[test]
fn test_inspect_shouldReturnCollection() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(dir.path(), "movie.srt")?;

    let collection = controller().inspect(&input, Some(SubtitleFormat::Srt))?;

    assert_eq!(collection.len(), 2);
    Ok(())
}
