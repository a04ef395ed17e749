/*!
 * Line classification.
 *
 * Each raw line is tested against an ordered list of rules; the first rule
 * that accepts the line decides its shape:
 *
 * 1. `Blank`         - nothing but whitespace
 * 2. `Index`         - digits only (`12`, `0007`), a block separator hint
 * 3. `Range`         - `start ARROW end [text]`, arrows `-->` `->` `--` `=>` `–` `—`
 *    `OpenRange`     - `start ARROW` with the end missing
 * 4. `StartWithText` - a timestamp at the very start of the line, then text
 * 5. `StartOnly`     - the whole line is one timestamp
 * 6. `Text`          - anything else
 *
 * Timestamps are only looked for at the start of a line. A clock time in the
 * middle of a sentence stays text. Bare decimal seconds (`103.06`) never
 * anchor rule 4, they count only on their own or inside an arrow pair.
 *
 * New quirks go in as new entries in `RULES`, not as special cases inside
 * existing rules.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::timestamp::{Timestamp, TimestampFamily, TimestampParser};

// @const: Index line
static INDEX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

// @const: Start token, arrow marker, remainder
static ARROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<start>\S+?)\s*(?:-->|->|--|=>|–|—)\s*(?P<rest>.*)$").unwrap()
});

// @const: First token and the text after it
static LEADING_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<token>\S+)\s+(?P<text>.+)$").unwrap()
});

/// Which rule accepted a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    Blank,
    Index,
    Range,
    OpenRange,
    StartWithText,
    StartOnly,
    Text,
}

impl LineShape {
    /// Whether lines of this shape carry a start time
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            LineShape::Range | LineShape::OpenRange | LineShape::StartWithText | LineShape::StartOnly
        )
    }

    /// Whether the line was introduced by an arrow marker
    pub fn has_arrow(self) -> bool {
        matches!(self, LineShape::Range | LineShape::OpenRange)
    }
}

/// Times and text payload of a line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineParts {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub text: String,
}

/// A classified line
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLine {
    pub shape: LineShape,
    /// The trimmed line
    pub raw: String,
    pub parts: LineParts,
    /// Start token as written
    pub start_text: Option<String>,
    /// End token as written
    pub end_text: Option<String>,
}

impl ClassifiedLine {
    fn untimed(shape: LineShape, text: &str) -> Self {
        ClassifiedLine {
            shape,
            raw: text.to_string(),
            parts: LineParts { start: None, end: None, text: text.to_string() },
            start_text: None,
            end_text: None,
        }
    }
}

type Rule = fn(&TimestampParser, &str) -> Option<ClassifiedLine>;

// Priority order matters, see module docs
const RULES: &[Rule] = &[blank_rule, index_rule, range_rule, start_with_text_rule, start_only_rule];

/// Line classifier bound to one timestamp convention
#[derive(Debug, Clone, Copy, Default)]
pub struct LineClassifier {
    parser: TimestampParser,
}

impl LineClassifier {
    pub fn new(parser: TimestampParser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &TimestampParser {
        &self.parser
    }

    /// Classify one raw line
    pub fn classify(&self, line: &str) -> ClassifiedLine {
        let trimmed = line.trim_start_matches('\u{feff}').trim();

        RULES
            .iter()
            .find_map(|rule| rule(&self.parser, trimmed))
            .unwrap_or_else(|| ClassifiedLine::untimed(LineShape::Text, trimmed))
    }
}

/// Classify a line with the default timestamp convention
pub fn classify(line: &str) -> LineParts {
    LineClassifier::default().classify(line).parts
}

fn blank_rule(_: &TimestampParser, line: &str) -> Option<ClassifiedLine> {
    line.is_empty().then(|| ClassifiedLine::untimed(LineShape::Blank, ""))
}

fn index_rule(_: &TimestampParser, line: &str) -> Option<ClassifiedLine> {
    INDEX_REGEX
        .is_match(line)
        .then(|| ClassifiedLine::untimed(LineShape::Index, line))
}

fn range_rule(parser: &TimestampParser, line: &str) -> Option<ClassifiedLine> {
    let caps = ARROW_REGEX.captures(line)?;
    let start_token = caps.name("start")?.as_str();
    let start = recognize_token(parser, start_token)?;
    let rest = caps.name("rest").map_or("", |m| m.as_str()).trim();

    if rest.is_empty() {
        return Some(ClassifiedLine {
            shape: LineShape::OpenRange,
            raw: line.to_string(),
            parts: LineParts { start: Some(start.seconds), end: None, text: String::new() },
            start_text: Some(start_token.to_string()),
            end_text: None,
        });
    }

    let (end_token, text) = match rest.split_once(char::is_whitespace) {
        Some((token, text)) => (token, text.trim()),
        None => (rest, ""),
    };
    let end = recognize_token(parser, end_token)?;

    Some(ClassifiedLine {
        shape: LineShape::Range,
        raw: line.to_string(),
        parts: LineParts { start: Some(start.seconds), end: Some(end.seconds), text: text.to_string() },
        start_text: Some(start_token.to_string()),
        end_text: Some(end_token.to_string()),
    })
}

fn start_with_text_rule(parser: &TimestampParser, line: &str) -> Option<ClassifiedLine> {
    let caps = LEADING_TOKEN_REGEX.captures(line)?;
    let token = caps.name("token")?.as_str();
    let start = recognize_token(parser, token)?;
    if start.family == TimestampFamily::BareSeconds {
        return None;
    }

    Some(ClassifiedLine {
        shape: LineShape::StartWithText,
        raw: line.to_string(),
        parts: LineParts {
            start: Some(start.seconds),
            end: None,
            text: caps.name("text")?.as_str().trim().to_string(),
        },
        start_text: Some(token.to_string()),
        end_text: None,
    })
}

fn start_only_rule(parser: &TimestampParser, line: &str) -> Option<ClassifiedLine> {
    let start = recognize_token(parser, line)?;

    Some(ClassifiedLine {
        shape: LineShape::StartOnly,
        raw: line.to_string(),
        parts: LineParts { start: Some(start.seconds), end: None, text: String::new() },
        start_text: Some(line.to_string()),
        end_text: None,
    })
}

/// Recognize a token, tolerating one trailing punctuation mark and one
/// pair of enclosing brackets (`00:11.900:`, `[00:05]`)
fn recognize_token(parser: &TimestampParser, token: &str) -> Option<Timestamp> {
    if let Some(ts) = parser.recognize(token) {
        return Some(ts);
    }

    let unpunctuated = token
        .strip_suffix(|c: char| matches!(c, ':' | ';' | ',' | '.'))
        .unwrap_or(token);
    let unbracketed = unpunctuated
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .or_else(|| unpunctuated.strip_prefix('(').and_then(|t| t.strip_suffix(')')))
        .unwrap_or(unpunctuated);

    if unbracketed.len() == token.len() {
        return None;
    }
    parser.recognize(unbracketed)
}
