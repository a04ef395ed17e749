/*!
 * Temporal consistency for caption blocks.
 *
 * Turns an arbitrary set of blocks into the validated intermediate
 * representation, in this order:
 * 1. reject blocks whose end is not after their start
 * 2. sort by start, then end
 * 3. merge blocks sharing a start
 * 4. trim overlaps up to the tolerance, reject larger ones
 * 5. reject blocks longer than the duration ceiling
 * 6. trim every line, drop blank lines, then blocks without lines left
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::caption::CaptionBlock;
use crate::errors::TimingError;

/// Largest overlap between neighbours that is trimmed instead of rejected
pub const DEFAULT_OVERLAP_TOLERANCE_SECS: f64 = 10.0;

/// Longest a single caption may stay on screen
pub const DEFAULT_MAX_DURATION_SECS: f64 = 300.0;

/// Configuration for the consistency engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsistencyConfig {
    /// Maximum overlap in seconds that is fixed automatically
    #[serde(default = "default_overlap_tolerance_secs")]
    pub overlap_tolerance_secs: f64,

    /// Maximum caption duration in seconds
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: f64,
}

fn default_overlap_tolerance_secs() -> f64 {
    DEFAULT_OVERLAP_TOLERANCE_SECS
}

fn default_max_duration_secs() -> f64 {
    DEFAULT_MAX_DURATION_SECS
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            overlap_tolerance_secs: DEFAULT_OVERLAP_TOLERANCE_SECS,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
        }
    }
}

/// Orders, merges and validates caption blocks
#[derive(Debug, Clone, Default)]
pub struct ConsistencyEngine {
    config: ConsistencyConfig,
}

impl ConsistencyEngine {
    /// Create an engine with the default tolerance and ceiling
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom limits
    pub fn with_config(config: ConsistencyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsistencyConfig {
        &self.config
    }

    /// Produce the validated, ordered caption sequence or the first timing error
    pub fn reconcile(&self, blocks: Vec<CaptionBlock>) -> Result<Vec<CaptionBlock>, TimingError> {
        let input_count = blocks.len();

        for block in &blocks {
            check_range(block)?;
        }

        let mut sorted = blocks;
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

        let mut merged = merge_equal_starts(sorted);
        let merged_count = input_count - merged.len();

        let trimmed_count = self.resolve_overlaps(&mut merged)?;

        for block in &merged {
            self.check_duration(block)?;
        }

        let reconciled: Vec<CaptionBlock> = merged
            .into_iter()
            .filter_map(|mut block| {
                block.lines = block
                    .lines
                    .into_iter()
                    .map(|line| line.trim().to_string())
                    .filter(|line| !line.is_empty())
                    .collect();
                (!block.lines.is_empty()).then_some(block)
            })
            .collect();

        debug!(
            "Reconciled {} blocks into {} ({} merged, {} trimmed, {} empty dropped)",
            input_count,
            reconciled.len(),
            merged_count,
            trimmed_count,
            input_count - merged_count - reconciled.len()
        );

        Ok(reconciled)
    }

    fn resolve_overlaps(&self, blocks: &mut [CaptionBlock]) -> Result<usize, TimingError> {
        let mut trimmed = 0;

        for i in 1..blocks.len() {
            let next_start = blocks[i].start;
            let current = &blocks[i - 1];
            if current.end <= next_start {
                continue;
            }

            let overlap = current.end - next_start;
            if exceeds(overlap, self.config.overlap_tolerance_secs) {
                return Err(TimingError::UnresolvableOverlap {
                    first: current.span(),
                    second: blocks[i].span(),
                    overlap_secs: overlap,
                    tolerance_secs: self.config.overlap_tolerance_secs,
                });
            }

            blocks[i - 1].end = next_start;
            trimmed += 1;
        }

        Ok(trimmed)
    }

    fn check_duration(&self, block: &CaptionBlock) -> Result<(), TimingError> {
        let duration = block.duration();
        if exceeds(duration, self.config.max_duration_secs) {
            return Err(TimingError::DurationTooLong {
                span: block.span(),
                duration_secs: duration,
                max_secs: self.config.max_duration_secs,
            });
        }
        Ok(())
    }
}

/// Reconcile with the default tolerance and ceiling
pub fn reconcile(blocks: Vec<CaptionBlock>) -> Result<Vec<CaptionBlock>, TimingError> {
    ConsistencyEngine::new().reconcile(blocks)
}

// Limits are compared in whole milliseconds
fn exceeds(value: f64, limit: f64) -> bool {
    (value * 1000.0).round() > (limit * 1000.0).round()
}

fn check_range(block: &CaptionBlock) -> Result<(), TimingError> {
    let valid = block.start.is_finite()
        && block.end.is_finite()
        && block.start >= 0.0
        && block.end > block.start;

    if valid {
        Ok(())
    } else {
        Err(TimingError::InvalidRange { span: block.span() })
    }
}

// Input must already be sorted; merged lines keep the sorted order
fn merge_equal_starts(sorted: Vec<CaptionBlock>) -> Vec<CaptionBlock> {
    let mut merged: Vec<CaptionBlock> = Vec::with_capacity(sorted.len());

    for block in sorted {
        match merged.last_mut() {
            Some(last) if last.start == block.start => {
                last.end = last.end.max(block.end);
                last.lines.extend(block.lines);
            }
            _ => merged.push(block),
        }
    }

    merged
}
