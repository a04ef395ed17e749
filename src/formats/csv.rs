use std::collections::HashMap;

use log::debug;

use super::{FormatConverter, SubtitleFormat};
use crate::caption::CaptionBlock;
use crate::errors::SubtitleError;
use crate::parsing::{BlockAssembler, TimestampParser};

// @module: Delimited-table exports (.csv, .tsv and friends)

/// Cell separators tried during detection, in tie-break order
pub const ALLOWED_SEPARATORS: [u8; 4] = [b',', b';', b'|', b'\t'];

/// Delimited-table converter.
///
/// Rows are reshaped into the line form the assembler understands
/// (`start --> end` + text, `start` + text, or text alone) instead of
/// interpreting timestamps here.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvConverter;

impl FormatConverter for CsvConverter {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::Csv
    }

    fn can_parse(&self, content: &str) -> bool {
        let rows = match read_rows(content.trim()) {
            Ok(rows) => rows,
            Err(_) => return false,
        };
        if rows.len() < 2 {
            return false;
        }

        let width = rows[0].len();
        let parser = TimestampParser::default();
        width >= 2
            && rows.iter().all(|row| row.len() == width)
            && is_timestamp(&parser, &rows[1][0])
    }

    fn decode(&self, content: &str, parser: &TimestampParser) -> Result<Vec<CaptionBlock>, SubtitleError> {
        let rows = read_rows(content.trim())?;

        let has_header = rows.first().is_some_and(|row| !is_timestamp(parser, &row[0]));
        let sample = rows.get(usize::from(has_header));
        let has_start = sample.is_some_and(|row| is_timestamp(parser, &row[0]));
        let has_end = has_start && sample.is_some_and(|row| is_timestamp(parser, &row[1]));
        debug!(
            "CSV layout: {} rows, header: {}, start column: {}, end column: {}",
            rows.len(),
            has_header,
            has_start,
            has_end
        );

        let mut lines: Vec<String> = Vec::with_capacity(rows.len() * 2);
        for row in rows.iter().skip(usize::from(has_header)) {
            if has_end {
                lines.push(format!("{} --> {}", row[0].trim(), row[1].trim()));
                lines.push(row.get(2).cloned().unwrap_or_default());
            } else if has_start {
                lines.push(row[0].trim().to_string());
                lines.push(row[1].clone());
            } else {
                lines.push(row[0].clone());
            }
        }

        let assembly = BlockAssembler::new(*parser).assemble(lines.iter().flat_map(|cell| cell.lines()));
        Ok(assembly.blocks)
    }

    fn encode(&self, captions: &[CaptionBlock]) -> Result<String, SubtitleError> {
        let mut writer = ::csv::WriterBuilder::new()
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(["Start", "End", "Text"])?;
        for block in captions {
            writer.write_record([block.start.to_string(), block.end.to_string(), block.joined_text()])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| SubtitleError::Encode(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| SubtitleError::Encode(e.to_string()))
    }
}

/// Pick the separator that splits the most lines into the same column count
pub fn detect_separator(content: &str) -> u8 {
    let lines: Vec<&str> = content.lines().filter(|line| !line.trim().is_empty()).collect();

    let mut best = (ALLOWED_SEPARATORS[0], 0);
    for separator in ALLOWED_SEPARATORS {
        let mut widths: HashMap<usize, usize> = HashMap::new();
        for line in &lines {
            let width = line.split(char::from(separator)).count();
            if width >= 2 {
                *widths.entry(width).or_default() += 1;
            }
        }

        let score = widths.values().copied().max().unwrap_or(0);
        if score > best.1 {
            best = (separator, score);
        }
    }

    best.0
}

/// Read all rows; an empty table when any row has fewer than two cells.
/// Rows whose first two cells are blank are skipped.
fn read_rows(content: &str) -> Result<Vec<Vec<String>>, ::csv::Error> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(detect_separator(content))
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let row: Vec<String> = record?.iter().map(str::to_string).collect();
        if row.len() < 2 {
            return Ok(Vec::new());
        }
        if row[0].trim().is_empty() && row[1].trim().is_empty() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

fn is_timestamp(parser: &TimestampParser, cell: &str) -> bool {
    parser.parse(cell.trim()).is_some()
}
