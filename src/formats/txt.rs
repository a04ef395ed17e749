use super::{FormatConverter, SubtitleFormat};
use crate::caption::CaptionBlock;
use crate::errors::SubtitleError;
use crate::parsing::{BlockAssembler, TimestampParser};

// @module: Plain-text transcripts

/// Plain transcript converter, the fallback for anything unrecognized
#[derive(Debug, Clone, Copy, Default)]
pub struct TxtConverter;

impl FormatConverter for TxtConverter {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::Txt
    }

    fn can_parse(&self, _content: &str) -> bool {
        true
    }

    fn decode(&self, content: &str, parser: &TimestampParser) -> Result<Vec<CaptionBlock>, SubtitleError> {
        Ok(BlockAssembler::new(*parser).assemble(content.lines()).blocks)
    }

    /// One caption per line; timing is not written
    fn encode(&self, captions: &[CaptionBlock]) -> Result<String, SubtitleError> {
        Ok(captions
            .iter()
            .map(|block| block.joined_text() + "\n")
            .collect())
    }
}
