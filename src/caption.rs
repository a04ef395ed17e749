use std::fmt;

use crate::errors::TimeSpan;
use crate::parsing::timestamp::format_timestamp;

// @module: Caption blocks, the shared intermediate representation

/// Where a block's timing came from in the source text.
///
/// Only used to make timing errors point back at the input; it never takes
/// part in block equality.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOrigin {
    /// 1-based line number of the line that opened the block
    pub line: usize,

    /// Start token exactly as written
    pub start_text: String,

    /// End token exactly as written, `None` when the end was inferred
    pub end_text: Option<String>,
}

/// One timed unit of displayed text
#[derive(Debug, Clone)]
pub struct CaptionBlock {
    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Display lines, in order
    pub lines: Vec<String>,

    // @field: Source position, diagnostic only
    pub origin: Option<BlockOrigin>,
}

impl CaptionBlock {
    /// Create a block without origin information
    pub fn new<I, S>(start: f64, end: f64, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CaptionBlock {
            start,
            end,
            lines: lines.into_iter().map(Into::into).collect(),
            origin: None,
        }
    }

    /// Attach the source position that produced this block
    pub fn with_origin(mut self, origin: BlockOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// The start time as the input wrote it, or rendered as a clock value
    pub fn start_label(&self) -> String {
        match &self.origin {
            Some(origin) => origin.start_text.clone(),
            None => format_timestamp(self.start),
        }
    }

    /// The end time as the input wrote it, or rendered as a clock value
    pub fn end_label(&self) -> String {
        match self.origin.as_ref().and_then(|o| o.end_text.as_ref()) {
            Some(text) => text.clone(),
            None if self.origin.is_some() => format!("{} (inferred)", format_timestamp(self.end)),
            None => format_timestamp(self.end),
        }
    }

    /// Time range description used by timing errors
    pub fn span(&self) -> TimeSpan {
        TimeSpan {
            start: self.start_label(),
            end: self.end_label(),
            line: self.origin.as_ref().map(|o| o.line),
        }
    }

    /// All lines joined with a single space
    pub fn joined_text(&self) -> String {
        self.lines.join(" ")
    }
}

impl PartialEq for CaptionBlock {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && self.lines == other.lines
    }
}

impl fmt::Display for CaptionBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} --> {}  {}",
            format_timestamp(self.start),
            format_timestamp(self.end),
            self.lines.join(" | ")
        )
    }
}
