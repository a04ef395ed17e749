/*!
 * # subconv - heuristic subtitle converter
 *
 * A Rust library that reads subtitles from loosely structured text and turns
 * them into a validated, ordered caption sequence.
 *
 * ## Features
 *
 * - Recognizes many timestamp spellings (`HH:MM:SS,mmm`, `MM:SS`, frame counts, bare seconds)
 * - Classifies lines as timing ranges, start times with text, indexes or caption text
 * - Assembles captions from SRT files, DFXP/TTML documents, CSV exports and plain transcripts
 * - Merges captions sharing a start time and trims small overlaps
 * - Rejects inconsistent timing with errors that quote the input
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `parsing`: The heuristic core:
 *   - `parsing::timestamp`: Timestamp token recognition and formatting
 *   - `parsing::classifier`: Line shape classification
 *   - `parsing::assembler`: Grouping classified lines into caption blocks
 * - `consistency`: Ordering, merging and validation of caption blocks
 * - `caption`: The caption block intermediate representation
 * - `formats`: SRT, DFXP, CSV and TXT converters plus format detection
 * - `subtitle_processor`: The all-or-nothing conversion facade
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod caption;
pub mod consistency;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod parsing;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use caption::{BlockOrigin, CaptionBlock};
pub use consistency::{reconcile, ConsistencyConfig, ConsistencyEngine};
pub use errors::{AppError, SubtitleError, TimeSpan, TimingError};
pub use formats::{detect_format, FormatConverter, SubtitleFormat};
pub use parsing::{assemble, classify, format_timestamp, parse_timestamp, LineParts, TimestampParser};
pub use subtitle_processor::{ConversionOptions, SubtitleCollection};
