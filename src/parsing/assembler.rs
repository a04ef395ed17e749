/*!
 * Heuristic block assembly.
 *
 * Groups classified lines into caption blocks. The timing convention of the
 * input is decided once, from the first line that carries a time, and is
 * passed down explicitly:
 *
 * - `StartEnd`: arrow lines (`start --> end`) open blocks; a lone timestamp
 *   line is caption text.
 * - `StartOnly`: every time-bearing line opens a block; missing ends are
 *   taken from the next block's start, or `start + 1` for the last block.
 * - `Untimed`: no usable times; captions are blank-line paragraphs (or single
 *   lines when the input has no blank lines) numbered one second apart.
 *
 * Assembly never fails. Ordering and overlap problems are left for the
 * consistency engine.
 */

use log::{debug, trace};

use super::classifier::{ClassifiedLine, LineClassifier, LineShape};
use super::timestamp::TimestampParser;
use crate::caption::{BlockOrigin, CaptionBlock};

/// Length given to the last caption when nothing else bounds it
pub const DEFAULT_CAPTION_SECS: f64 = 1.0;

/// How an input expresses caption timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingConvention {
    StartEnd,
    StartOnly,
    Untimed,
}

impl TimingConvention {
    /// Infer the convention from the first time-bearing line
    pub fn infer(lines: &[ClassifiedLine]) -> Self {
        match lines.iter().find(|line| line.shape.is_timed()) {
            Some(line) if line.shape == LineShape::Range => TimingConvention::StartEnd,
            Some(_) => TimingConvention::StartOnly,
            None => TimingConvention::Untimed,
        }
    }

    /// Whether a line of this shape opens a new block under this convention
    pub fn opens_block(self, shape: LineShape) -> bool {
        match self {
            TimingConvention::StartEnd => shape.has_arrow(),
            TimingConvention::StartOnly => shape.is_timed(),
            TimingConvention::Untimed => false,
        }
    }
}

/// Result of assembling one input
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub convention: TimingConvention,
    pub blocks: Vec<CaptionBlock>,
}

// Block whose end may still be unknown
struct PendingBlock {
    start: f64,
    end: Option<f64>,
    lines: Vec<String>,
    origin: BlockOrigin,
}

/// Turns loosely structured text into unvalidated caption blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockAssembler {
    classifier: LineClassifier,
}

impl BlockAssembler {
    pub fn new(parser: TimestampParser) -> Self {
        Self { classifier: LineClassifier::new(parser) }
    }

    /// Assemble raw lines into blocks
    pub fn assemble<I, S>(&self, lines: I) -> Assembly
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classified: Vec<ClassifiedLine> = lines
            .into_iter()
            .map(|line| self.classifier.classify(line.as_ref()))
            .collect();

        let convention = TimingConvention::infer(&classified);
        let blocks = match convention {
            TimingConvention::Untimed => assemble_untimed(&classified),
            timed => assemble_timed(&classified, timed),
        };

        debug!(
            "Assembled {} blocks from {} lines ({:?} convention)",
            blocks.len(),
            classified.len(),
            convention
        );

        Assembly { convention, blocks }
    }
}

/// Assemble raw lines with the default timestamp convention
pub fn assemble<I, S>(lines: I) -> Vec<CaptionBlock>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    BlockAssembler::default().assemble(lines).blocks
}

fn assemble_timed(lines: &[ClassifiedLine], convention: TimingConvention) -> Vec<CaptionBlock> {
    let mut pending: Vec<PendingBlock> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;

        if convention.opens_block(line.shape) {
            if let Some(start) = line.parts.start {
                let mut block = PendingBlock {
                    start,
                    end: line.parts.end,
                    lines: Vec::new(),
                    origin: BlockOrigin {
                        line: line_no,
                        start_text: line.start_text.clone().unwrap_or_default(),
                        end_text: line.end_text.clone(),
                    },
                };
                if !line.parts.text.is_empty() {
                    block.lines.push(line.parts.text.clone());
                }
                pending.push(block);
                continue;
            }
        }

        match line.shape {
            LineShape::Blank => {}
            LineShape::Index => trace!("Dropping index line {}: {}", line_no, line.raw),
            _ => match pending.last_mut() {
                Some(block) => block.lines.push(line.raw.clone()),
                None => debug!("Dropping line {} before first timestamp: {}", line_no, line.raw),
            },
        }
    }

    let next_starts: Vec<Option<f64>> = pending
        .iter()
        .skip(1)
        .map(|block| Some(block.start))
        .chain(std::iter::once(None))
        .collect();

    pending
        .into_iter()
        .zip(next_starts)
        .map(|(block, next_start)| {
            let end = block
                .end
                .or(next_start)
                .unwrap_or(block.start + DEFAULT_CAPTION_SECS);
            CaptionBlock::new(block.start, end, block.lines).with_origin(block.origin)
        })
        .collect()
}

fn assemble_untimed(lines: &[ClassifiedLine]) -> Vec<CaptionBlock> {
    let first = lines.iter().position(|l| l.shape != LineShape::Blank);
    let last = lines.iter().rposition(|l| l.shape != LineShape::Blank);
    let body = match (first, last) {
        (Some(first), Some(last)) => &lines[first..=last],
        _ => return Vec::new(),
    };

    let paragraphs = body.iter().any(|l| l.shape == LineShape::Blank);

    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in body {
        if line.shape == LineShape::Blank {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else if paragraphs {
            current.push(line.raw.clone());
        } else {
            groups.push(vec![line.raw.clone()]);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(i, group)| {
            let start = i as f64 * DEFAULT_CAPTION_SECS;
            CaptionBlock::new(start, start + DEFAULT_CAPTION_SECS, group)
        })
        .collect()
}
