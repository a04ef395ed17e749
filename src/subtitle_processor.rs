use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::caption::CaptionBlock;
use crate::consistency::{ConsistencyConfig, ConsistencyEngine};
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::formats::{detect_format, SubtitleFormat};
use crate::parsing::TimestampParser;

// @module: Subtitle loading, validation and conversion

/// Settings applied while turning raw content into a collection
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    // @field: Interpretation of ambiguous timestamp fractions
    pub parser: TimestampParser,

    // @field: Overlap tolerance and duration ceiling
    pub consistency: ConsistencyConfig,
}

// @struct: Validated caption sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCollection {
    // @field: File the captions were read from
    source_file: Option<PathBuf>,

    // @field: Format the captions were decoded from
    source_format: Option<SubtitleFormat>,

    // @field: Reconciled captions, ordered and non-overlapping
    entries: Vec<CaptionBlock>,
}

impl SubtitleCollection {
    /// Build a collection from arbitrary blocks with the default limits
    pub fn from_blocks(blocks: Vec<CaptionBlock>) -> Result<Self, SubtitleError> {
        Self::from_blocks_with(blocks, &ConsistencyConfig::default())
    }

    /// Build a collection from arbitrary blocks with custom limits
    pub fn from_blocks_with(blocks: Vec<CaptionBlock>, config: &ConsistencyConfig) -> Result<Self, SubtitleError> {
        let entries = ConsistencyEngine::with_config(config.clone()).reconcile(blocks)?;
        Ok(SubtitleCollection {
            source_file: None,
            source_format: None,
            entries,
        })
    }

    /// Parse content of any supported format, detected from the content
    pub fn parse(content: &str) -> Result<Self, SubtitleError> {
        Self::parse_with(content, None, &ConversionOptions::default())
    }

    /// Parse content known to be in the given format
    pub fn parse_as(content: &str, format: SubtitleFormat) -> Result<Self, SubtitleError> {
        Self::parse_with(content, Some(format), &ConversionOptions::default())
    }

    /// Parse content with explicit options.
    ///
    /// Either every caption converts or nothing does: the first timing
    /// error aborts the whole conversion.
    pub fn parse_with(
        content: &str,
        format: Option<SubtitleFormat>,
        options: &ConversionOptions,
    ) -> Result<Self, SubtitleError> {
        let format = format.unwrap_or_else(|| detect_format(content));
        debug!("Parsing {} bytes as {}", content.len(), format);

        let blocks = format.converter().decode(content, &options.parser)?;
        let mut collection = Self::from_blocks_with(blocks, &options.consistency)?;
        if collection.entries.is_empty() {
            return Err(SubtitleError::NoCaptions);
        }

        collection.source_format = Some(format);
        Ok(collection)
    }

    /// Read and parse a subtitle file
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        format: Option<SubtitleFormat>,
        options: &ConversionOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;

        let mut collection = Self::parse_with(&content, format, options)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;
        collection.source_file = Some(path.to_path_buf());

        info!(
            "Loaded {} captions from {} ({})",
            collection.entries.len(),
            path.display(),
            collection.source_format.map(|f| f.to_string()).unwrap_or_default()
        );
        Ok(collection)
    }

    pub fn entries(&self) -> &[CaptionBlock] {
        &self.entries
    }

    pub fn source_format(&self) -> Option<SubtitleFormat> {
        self.source_format
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total time from the first start to the last end, in seconds
    pub fn total_duration(&self) -> f64 {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => last.end - first.start,
            _ => 0.0,
        }
    }

    /// Encode the captions in another format
    pub fn to_format(&self, format: SubtitleFormat) -> Result<String, SubtitleError> {
        format.converter().encode(&self.entries)
    }

    /// Encode the captions and write them to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, format: SubtitleFormat) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_format(format)?;

        FileManager::write_to_file(path, &content)
            .with_context(|| format!("Failed to write {} subtitles", format))?;
        debug!("Wrote {} captions to {}", self.entries.len(), path.display());

        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        match &self.source_file {
            Some(path) => writeln!(f, "Source: {}", path.display())?,
            None => writeln!(f, "Source: <memory>")?,
        }
        match self.source_format {
            Some(format) => writeln!(f, "Format: {}", format)?,
            None => writeln!(f, "Format: unknown")?,
        }
        writeln!(f, "Entries: {}", self.entries.len())?;
        writeln!(f, "Duration: {:.3}s", self.total_duration())?;
        Ok(())
    }
}
