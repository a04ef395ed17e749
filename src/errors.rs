/*!
 * Error types for the subconv application.
 *
 * Timing problems are the only failures the parsing core itself reports;
 * everything else here belongs to the format collaborators and the
 * application shell around them.
 */

use std::fmt;

use thiserror::Error;

/// A caption's time range as the user would find it in the source file
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSpan {
    /// Start time text
    pub start: String,
    /// End time text
    pub end: String,
    /// 1-based source line, when known
    pub line: Option<usize>,
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' --> '{}'", self.start, self.end)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        Ok(())
    }
}

/// Timing inconsistencies that make a conversion fail
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimingError {
    /// End time not after start time, or a time that is negative or not finite
    #[error("Invalid caption timing {span}: end time must be after a non-negative start time")]
    InvalidRange {
        /// Offending caption
        span: TimeSpan,
    },

    /// Two adjacent captions overlap by more than the tolerance
    #[error("Captions {first} and {second} overlap by {overlap_secs:.3}s (more than {tolerance_secs}s can not be fixed automatically)")]
    UnresolvableOverlap {
        /// Earlier caption
        first: TimeSpan,
        /// Later caption
        second: TimeSpan,
        /// Overlap in seconds
        overlap_secs: f64,
        /// Configured tolerance in seconds
        tolerance_secs: f64,
    },

    /// A caption stays on screen longer than the ceiling
    #[error("Caption {span} lasts {duration_secs:.3}s (max: {max_secs}s)")]
    DurationTooLong {
        /// Offending caption
        span: TimeSpan,
        /// Caption duration in seconds
        duration_secs: f64,
        /// Configured ceiling in seconds
        max_secs: f64,
    },
}

/// Errors that can occur while decoding, validating or encoding subtitles
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The captions are not temporally consistent
    #[error("Timing error: {0}")]
    Timing(#[from] TimingError),

    /// Delimited-table reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XML caption document could not be read
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A timing line or attribute that cannot be read, quoted as written
    #[error("Something is wrong with timestamps on this line: {0}")]
    MalformedTiming(String),

    /// Encoder output could not be produced
    #[error("Failed to encode subtitles: {0}")]
    Encode(String),

    /// Unknown format name or extension
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// Nothing displayable was found in the input
    #[error("No captions found in input")]
    NoCaptions,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
