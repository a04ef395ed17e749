/*!
 * Subtitle format converters.
 *
 * Every format decodes into unvalidated caption blocks and encodes from the
 * reconciled intermediate representation:
 * - `srt`: SubRip, fully explicit timing
 * - `dfxp`: DFXP / TTML XML documents
 * - `csv`: delimited-table exports, reshaped into lines for the assembler
 * - `txt`: plain transcripts, handled entirely by the assembler
 *
 * Detection asks each converter in turn, `txt` accepts anything and comes last.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::caption::CaptionBlock;
use crate::errors::SubtitleError;
use crate::parsing::TimestampParser;

pub mod csv;
pub mod dfxp;
pub mod srt;
pub mod txt;

pub use self::csv::CsvConverter;
pub use self::dfxp::DfxpConverter;
pub use self::srt::SrtConverter;
pub use self::txt::TxtConverter;

/// Supported subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Dfxp,
    Csv,
    Txt,
}

impl SubtitleFormat {
    /// All formats in detection order
    pub const ALL: [SubtitleFormat; 4] = [
        SubtitleFormat::Srt,
        SubtitleFormat::Dfxp,
        SubtitleFormat::Csv,
        SubtitleFormat::Txt,
    ];

    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Dfxp => "dfxp",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    /// Look a format up by file extension, case-insensitive; `ttml` is read as DFXP
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');
        if extension.eq_ignore_ascii_case("ttml") {
            return Some(Self::Dfxp);
        }
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(extension))
    }

    /// The converter implementing this format
    pub fn converter(self) -> Box<dyn FormatConverter> {
        match self {
            Self::Srt => Box::new(SrtConverter),
            Self::Dfxp => Box::new(DfxpConverter),
            Self::Csv => Box::new(CsvConverter),
            Self::Txt => Box::new(TxtConverter),
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| SubtitleError::UnsupportedFormat(s.to_string()))
    }
}

/// Common interface of all format converters
pub trait FormatConverter {
    /// The format this converter handles
    fn format(&self) -> SubtitleFormat;

    /// Whether the content looks like this format
    fn can_parse(&self, content: &str) -> bool;

    /// Decode content into unvalidated caption blocks
    fn decode(&self, content: &str, parser: &TimestampParser) -> Result<Vec<CaptionBlock>, SubtitleError>;

    /// Encode reconciled captions
    fn encode(&self, captions: &[CaptionBlock]) -> Result<String, SubtitleError>;
}

/// Pick the first format in detection order that accepts the content
pub fn detect_format(content: &str) -> SubtitleFormat {
    SubtitleFormat::ALL
        .into_iter()
        .find(|format| format.converter().can_parse(content))
        .unwrap_or(SubtitleFormat::Txt)
}
