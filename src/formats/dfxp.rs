use std::fmt::Write;

use log::{debug, warn};
use once_cell::sync::Lazy;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use super::{FormatConverter, SubtitleFormat};
use crate::caption::{BlockOrigin, CaptionBlock};
use crate::errors::SubtitleError;
use crate::parsing::{format_clock, TimestampParser};

// @module: DFXP / TTML timed text documents

// @const: Root `tt` element, with or without a namespace prefix
static ROOT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(?:[A-Za-z_][\w.-]*:)?tt[\s>/]").unwrap()
});

// @const: Offset time such as `12.5s`, `500ms` or `90000t`
static OFFSET_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<value>\d+(?:\.\d+)?)(?P<unit>h|ms|m|s|f|t)$").unwrap()
});

// @const: Whitespace that only indents markup
static LAYOUT_WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());

/// Frame rate TTML assumes when the document does not declare one
const DEFAULT_TTML_FRAME_RATE: f64 = 30.0;

const DOCUMENT_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<tt xmlns=\"http://www.w3.org/ns/ttml\" xmlns:tts=\"http://www.w3.org/ns/ttml#styling\" xml:lang=\"en\">\n  \
<body>\n    <div>\n";

const DOCUMENT_FOOTER: &str = "    </div>\n  </body>\n</tt>\n";

/// DFXP (TTML) converter
#[derive(Debug, Clone, Copy, Default)]
pub struct DfxpConverter;

impl FormatConverter for DfxpConverter {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::Dfxp
    }

    fn can_parse(&self, content: &str) -> bool {
        content.trim_start_matches('\u{feff}').trim_start().starts_with('<') && ROOT_REGEX.is_match(content)
    }

    /// Every `<p>` with timing becomes one block; `<br/>` splits lines and
    /// nested spans contribute their text.
    fn decode(&self, content: &str, parser: &TimestampParser) -> Result<Vec<CaptionBlock>, SubtitleError> {
        let mut reader = Reader::from_str(content);
        let mut time_base = TimeBase::default();
        let mut blocks = Vec::new();
        let mut current: Option<Paragraph> = None;

        loop {
            let position = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(element) => match element.local_name().as_ref() {
                    b"tt" => time_base = TimeBase::from_root(&element)?,
                    b"p" => {
                        let line = line_at(content, position);
                        current = Some(Paragraph::open(&element, line, parser, &time_base)?);
                    }
                    b"br" => current.iter_mut().for_each(Paragraph::break_line),
                    _ => {}
                },
                Event::Empty(element) => match element.local_name().as_ref() {
                    b"tt" => time_base = TimeBase::from_root(&element)?,
                    b"br" => current.iter_mut().for_each(Paragraph::break_line),
                    _ => {}
                },
                Event::Text(text) => {
                    if let Some(paragraph) = current.as_mut() {
                        paragraph.push_text(&text.unescape().map_err(quick_xml::Error::from)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(paragraph) = current.as_mut() {
                        paragraph.push_text(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(element) if element.local_name().as_ref() == b"p" => {
                    blocks.extend(current.take().map(Paragraph::finish));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if current.is_some() {
            warn!("DFXP document ended inside a <p> element");
        }
        debug!("Read {} timed paragraphs from DFXP", blocks.len());

        Ok(blocks)
    }

    fn encode(&self, captions: &[CaptionBlock]) -> Result<String, SubtitleError> {
        let mut output = String::from(DOCUMENT_HEADER);
        for block in captions {
            let lines: Vec<_> = block.lines.iter().map(|line| escape(line.as_str())).collect();
            writeln!(
                output,
                "      <p begin=\"{}\" end=\"{}\">{}</p>",
                format_clock(block.start, '.'),
                format_clock(block.end, '.'),
                lines.join("<br/>")
            )
            .map_err(|e| SubtitleError::Encode(e.to_string()))?;
        }
        output.push_str(DOCUMENT_FOOTER);
        Ok(output)
    }
}

// @struct: Rates declared on the root element
#[derive(Debug, Clone, Copy)]
struct TimeBase {
    frame_rate: f64,
    tick_rate: f64,
}

impl Default for TimeBase {
    fn default() -> Self {
        Self { frame_rate: DEFAULT_TTML_FRAME_RATE, tick_rate: 1.0 }
    }
}

impl TimeBase {
    fn from_root(element: &BytesStart) -> Result<Self, SubtitleError> {
        let mut base = Self::default();
        if let Some(rate) = attribute(element, b"frameRate")? {
            base.frame_rate = positive_rate(&rate)?;
        }
        if let Some(rate) = attribute(element, b"tickRate")? {
            base.tick_rate = positive_rate(&rate)?;
        }
        Ok(base)
    }

    /// Clock values go through the shared parser, offsets are read here
    fn seconds(&self, value: &str, parser: &TimestampParser) -> Option<f64> {
        let value = value.trim();
        if let Some(seconds) = parser.parse(value) {
            return Some(seconds);
        }

        let caps = OFFSET_TIME_REGEX.captures(value)?;
        let amount: f64 = caps.name("value")?.as_str().parse().ok()?;
        let seconds = match caps.name("unit")?.as_str() {
            "h" => amount * 3600.0,
            "m" => amount * 60.0,
            "s" => amount,
            "ms" => amount / 1000.0,
            "f" => amount / self.frame_rate,
            "t" => amount / self.tick_rate,
            _ => return None,
        };
        Some(seconds)
    }
}

// @struct: A `<p>` being read
struct Paragraph {
    start: f64,
    end: f64,
    origin: BlockOrigin,
    lines: Vec<String>,
    pending: String,
}

impl Paragraph {
    fn open(
        element: &BytesStart,
        line: usize,
        parser: &TimestampParser,
        time_base: &TimeBase,
    ) -> Result<Self, SubtitleError> {
        let begin = attribute(element, b"begin")?
            .ok_or_else(|| SubtitleError::MalformedTiming(format!("<p> at line {} has no begin", line)))?;
        let start = time_base
            .seconds(&begin, parser)
            .ok_or_else(|| SubtitleError::MalformedTiming(format!("begin=\"{}\"", begin)))?;

        let (end, end_text) = match (attribute(element, b"end")?, attribute(element, b"dur")?) {
            (Some(end_text), _) => {
                let end = time_base
                    .seconds(&end_text, parser)
                    .ok_or_else(|| SubtitleError::MalformedTiming(format!("end=\"{}\"", end_text)))?;
                (end, end_text)
            }
            (None, Some(dur)) => {
                let duration = time_base
                    .seconds(&dur, parser)
                    .ok_or_else(|| SubtitleError::MalformedTiming(format!("dur=\"{}\"", dur)))?;
                (start + duration, dur)
            }
            (None, None) => {
                return Err(SubtitleError::MalformedTiming(format!(
                    "<p begin=\"{}\"> at line {} has no end or dur",
                    begin, line
                )));
            }
        };

        Ok(Self {
            start,
            end,
            origin: BlockOrigin { line, start_text: begin, end_text: Some(end_text) },
            lines: Vec::new(),
            pending: String::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        self.pending.push_str(&LAYOUT_WHITESPACE_REGEX.replace_all(text, " "));
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.pending);
        self.lines.push(line.trim().to_string());
    }

    fn finish(mut self) -> CaptionBlock {
        self.break_line();
        CaptionBlock::new(self.start, self.end, self.lines).with_origin(self.origin)
    }
}

/// Unescaped value of an attribute, matched on its local name
fn attribute(element: &BytesStart, name: &[u8]) -> Result<Option<String>, SubtitleError> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value().map_err(quick_xml::Error::from)?.into_owned()));
        }
    }
    Ok(None)
}

fn positive_rate(value: &str) -> Result<f64, SubtitleError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| SubtitleError::MalformedTiming(format!("rate=\"{}\"", value)))
}

/// 1-based line of a byte offset
fn line_at(content: &str, offset: usize) -> usize {
    let offset = offset.min(content.len());
    content.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}
