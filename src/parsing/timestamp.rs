/*!
 * Timestamp recognition.
 *
 * The single place that decides whether a token is a timestamp. Accepted
 * families:
 * - `HH:MM:SS` plus an optional sub-second field after `,` `.` or `:`
 * - `MM:SS` plus an optional sub-second field after `,` or `.`
 * - bare seconds with a decimal point (`5050.81`)
 *
 * `.` and `,` may also separate the clock fields (`00.00.05`, `00,01,05,500`).
 * A token with no `:` at all needs two-digit clock fields and at most three
 * fraction digits, so grouped numbers and version strings are not times.
 *
 * Recognition is anchored: the whole token must conform, a timestamp buried
 * in a longer string is never found here.
 */

use once_cell::sync::Lazy;
use regex::Regex;

// @const: Leading field followed by up to three separated fields
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)((?:[:.,]\d+){0,3})$").unwrap()
});

// @const: One separator and the field after it
static FIELD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([:.,])(\d+)").unwrap()
});

/// Frame rate assumed for `HH:MM:SS:FF` tokens unless configured otherwise
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

/// How a sub-second field introduced by `:` is read
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FractionStyle {
    /// Positional decimal digits, like `,` and `.` fractions
    Decimal,
    /// A frame count at the given frames per second
    Frames(f64),
}

impl Default for FractionStyle {
    fn default() -> Self {
        FractionStyle::Frames(DEFAULT_FRAME_RATE)
    }
}

/// Which token family matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFamily {
    /// `HH:MM:SS`
    Clock,
    /// `HH:MM:SS,fff`, `HH:MM:SS.fff` or `HH:MM:SS:ff`
    ClockWithFraction,
    /// `MM:SS` or `MM:SS,f`
    MinutesSeconds,
    /// `5050.81`
    BareSeconds,
}

/// A recognized timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp {
    /// Value in seconds
    pub seconds: f64,
    /// Family the token belongs to
    pub family: TimestampFamily,
}

/// Timestamp recognizer with a fixed sub-second convention
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimestampParser {
    colon_fraction: FractionStyle,
}

impl TimestampParser {
    /// Create a parser reading `:`-introduced sub-second fields as frames at 25 fps
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with an explicit convention for `:`-introduced fractions
    pub fn with_fraction_style(colon_fraction: FractionStyle) -> Self {
        Self { colon_fraction }
    }

    pub fn fraction_style(&self) -> FractionStyle {
        self.colon_fraction
    }

    /// Parse a token into seconds, `None` when it is not a timestamp
    pub fn parse(&self, token: &str) -> Option<f64> {
        self.recognize(token).map(|ts| ts.seconds)
    }

    /// Parse a token and report which family it matched
    pub fn recognize(&self, token: &str) -> Option<Timestamp> {
        let caps = TOKEN_REGEX.captures(token)?;

        let mut fields = vec![caps.get(1)?.as_str()];
        let mut separators = Vec::with_capacity(3);
        for part in FIELD_REGEX.captures_iter(caps.get(2)?.as_str()) {
            separators.push(part.get(1)?.as_str().chars().next()?);
            fields.push(part.get(2)?.as_str());
        }

        // Without any `:` the fields must read like a clock, not a grouped
        // number (`1.234.567`, `192.168.1.10`)
        let clock_like = separators.contains(&':');

        match (fields.as_slice(), separators.as_slice()) {
            ([minutes, seconds], [':']) => {
                let whole = minutes_seconds(minutes, seconds)?;
                Some(Timestamp { seconds: whole as f64, family: TimestampFamily::MinutesSeconds })
            }
            ([_, _], ['.']) => {
                let seconds = token.parse::<f64>().ok()?;
                Some(Timestamp { seconds, family: TimestampFamily::BareSeconds })
            }
            // `10,000` and friends read as numbers, not times
            ([_, _], _) => None,
            ([minutes, seconds, fraction], [':', '.' | ',']) => {
                let whole = minutes_seconds(minutes, seconds)?;
                Some(Timestamp {
                    seconds: with_decimal_fraction(whole, fraction)?,
                    family: TimestampFamily::MinutesSeconds,
                })
            }
            ([hours, minutes, seconds], [_, ':']) => {
                let whole = hours_minutes_seconds(hours, minutes, seconds)?;
                Some(Timestamp { seconds: whole as f64, family: TimestampFamily::Clock })
            }
            // Colon-free three fields: `00.00.05` is a clock, `00.11.900` minutes and seconds
            ([hours, minutes, seconds], _) if two_digits(hours) && two_digits(minutes) && two_digits(seconds) => {
                let whole = hours_minutes_seconds(hours, minutes, seconds)?;
                Some(Timestamp { seconds: whole as f64, family: TimestampFamily::Clock })
            }
            ([minutes, seconds, fraction], _) if two_digits(minutes) && two_digits(seconds) && fraction.len() <= 3 => {
                let whole = minutes_seconds(minutes, seconds)?;
                Some(Timestamp {
                    seconds: with_decimal_fraction(whole, fraction)?,
                    family: TimestampFamily::MinutesSeconds,
                })
            }
            ([_, _, _], _) => None,
            ([hours, minutes, seconds, fraction], [_, _, ':']) => {
                let whole = hours_minutes_seconds(hours, minutes, seconds)?;
                // Frame counts have at most two digits; `00:00:08:200` is milliseconds
                let seconds = match self.colon_fraction {
                    FractionStyle::Frames(fps) if fraction.len() <= 2 => with_frames(whole, fraction, fps)?,
                    _ => with_decimal_fraction(whole, fraction)?,
                };
                Some(Timestamp { seconds, family: TimestampFamily::ClockWithFraction })
            }
            ([hours, minutes, seconds, fraction], _)
                if clock_like
                    || (two_digits(hours) && two_digits(minutes) && two_digits(seconds) && fraction.len() <= 3) =>
            {
                let whole = hours_minutes_seconds(hours, minutes, seconds)?;
                Some(Timestamp {
                    seconds: with_decimal_fraction(whole, fraction)?,
                    family: TimestampFamily::ClockWithFraction,
                })
            }
            _ => None,
        }
    }
}

/// Parse a token with the default convention
pub fn parse_timestamp(token: &str) -> Option<f64> {
    TimestampParser::default().parse(token)
}

/// Render seconds as `HH:MM:SS,mmm`, rounded to the nearest millisecond.
///
/// Hours widen past two digits when needed; negative or non-finite input
/// renders as zero.
pub fn format_timestamp(seconds: f64) -> String {
    format_clock(seconds, ',')
}

/// Render seconds as `HH:MM:SS` plus milliseconds after `millis_separator`
pub fn format_clock(seconds: f64, millis_separator: char) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, millis_separator, millis)
}

fn two_digits(field: &str) -> bool {
    field.len() == 2
}

fn minutes_seconds(minutes: &str, seconds: &str) -> Option<u64> {
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes.checked_mul(60)?.checked_add(seconds)
}

fn hours_minutes_seconds(hours: &str, minutes: &str, seconds: &str) -> Option<u64> {
    let hours: u64 = hours.parse().ok()?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)
}

// Built from the literal digits so `48.2` is the same f64 as the literal
fn with_decimal_fraction(whole: u64, fraction: &str) -> Option<f64> {
    format!("{}.{}", whole, fraction).parse::<f64>().ok()
}

fn with_frames(whole: u64, frames: &str, fps: f64) -> Option<f64> {
    let frames: u64 = frames.parse().ok()?;
    if fps.is_nan() || fps <= 0.0 || frames as f64 >= fps {
        return None;
    }
    // One division of exact values, so the result is correctly rounded
    Some((whole as f64 * fps + frames as f64) / fps)
}
