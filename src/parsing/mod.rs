/*!
 * Recovery of caption timing from loosely structured text.
 *
 * - `timestamp`: recognizes timestamp tokens
 * - `classifier`: decides what a single line carries
 * - `assembler`: groups classified lines into caption blocks
 */

pub mod timestamp;
pub mod classifier;
pub mod assembler;

pub use timestamp::{format_clock, format_timestamp, parse_timestamp, FractionStyle, TimestampParser};
pub use classifier::{classify, ClassifiedLine, LineClassifier, LineParts, LineShape};
pub use assembler::{assemble, Assembly, BlockAssembler, TimingConvention};
