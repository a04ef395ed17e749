use std::fmt::{self, Write};

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{FormatConverter, SubtitleFormat};
use crate::caption::{BlockOrigin, CaptionBlock};
use crate::errors::SubtitleError;
use crate::parsing::{format_timestamp, ClassifiedLine, LineClassifier, LineShape, TimestampParser};

// @module: SubRip (.srt) reading and writing

// @const: Strict SRT timing line, only used for detection
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @const: SRT sequence number line
static INDEX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

// @const: SubRip formatting tags (`<i>`, `<b>`, `<u>`, `<s>`, `<font ...>`)
static FORMATTING_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:b|i|u|s|font)(?:\s[^<>]*)?>").unwrap()
});

/// SubRip converter
#[derive(Debug, Clone, Copy, Default)]
pub struct SrtConverter;

impl FormatConverter for SrtConverter {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::Srt
    }

    fn can_parse(&self, content: &str) -> bool {
        let mut lines = content
            .lines()
            .map(|line| line.trim_start_matches('\u{feff}').trim())
            .skip_while(|line| line.is_empty());

        match (lines.next(), lines.next()) {
            (Some(index), Some(timing)) => INDEX_REGEX.is_match(index) && TIMING_REGEX.is_match(timing),
            _ => false,
        }
    }

    /// Timing lines accept every timestamp spelling the classifier knows,
    /// anything after the end time (cue settings) is ignored. A `-->` line
    /// without two readable times fails the whole decode. Formatting tags
    /// are dropped from caption text.
    fn decode(&self, content: &str, parser: &TimestampParser) -> Result<Vec<CaptionBlock>, SubtitleError> {
        let classifier = LineClassifier::new(*parser);
        let lines: Vec<ClassifiedLine> = content.lines().map(|line| classifier.classify(line)).collect();

        let mut blocks = Vec::new();
        let mut current: Option<CaptionBlock> = None;

        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;

            match line.shape {
                LineShape::Blank => {
                    blocks.extend(current.take());
                    continue;
                }
                LineShape::Range => {
                    if let Some(block) = cue_from_timing_line(line, line_no) {
                        blocks.extend(current.replace(block));
                        continue;
                    }
                }
                _ if line.raw.contains("-->") => {
                    return Err(SubtitleError::MalformedTiming(line.raw.clone()));
                }
                LineShape::Index => {
                    // Cues are not always separated by a blank line
                    let next_is_timing = lines.get(idx + 1).is_some_and(|next| next.shape == LineShape::Range);
                    if current.is_none() || next_is_timing {
                        continue;
                    }
                }
                _ => {}
            }

            match current.as_mut() {
                Some(block) => block.lines.push(strip_formatting(&line.raw)),
                None => warn!("Unexpected text at line {} before timing line: {}", line_no, line.raw),
            }
        }

        blocks.extend(current);

        Ok(blocks)
    }

    fn encode(&self, captions: &[CaptionBlock]) -> Result<String, SubtitleError> {
        let mut output = String::new();
        for (i, block) in captions.iter().enumerate() {
            write!(output, "{}", SrtCue { seq_num: i + 1, block })
                .map_err(|e| SubtitleError::Encode(e.to_string()))?;
        }
        Ok(output)
    }
}

// @struct: One numbered SRT cue
struct SrtCue<'a> {
    seq_num: usize,
    block: &'a CaptionBlock,
}

impl fmt::Display for SrtCue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            format_timestamp(self.block.start),
            format_timestamp(self.block.end)
        )?;
        for line in &self.block.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

fn strip_formatting(text: &str) -> String {
    FORMATTING_TAG_REGEX.replace_all(text, "").trim().to_string()
}

fn cue_from_timing_line(line: &ClassifiedLine, line_no: usize) -> Option<CaptionBlock> {
    let start = line.parts.start?;
    let end = line.parts.end?;

    Some(CaptionBlock::new(start, end, Vec::<String>::new()).with_origin(BlockOrigin {
        line: line_no,
        start_text: line.start_text.clone().unwrap_or_default(),
        end_text: line.end_text.clone(),
    }))
}
