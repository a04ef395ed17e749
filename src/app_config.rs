use anyhow::{anyhow, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::consistency::ConsistencyConfig;
use crate::formats::SubtitleFormat;
use crate::parsing::timestamp::DEFAULT_FRAME_RATE;
use crate::parsing::{FractionStyle, TimestampParser};
use crate::subtitle_processor::ConversionOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Timestamp interpretation
    #[serde(default)]
    pub timing: TimingConfig,

    /// Overlap tolerance and duration ceiling
    #[serde(default)]
    pub consistency: ConsistencyConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How a colon-separated fourth field (`HH:MM:SS:FF`) is read
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColonFraction {
    /// Frame count at the configured frame rate
    #[default]
    Frames,
    /// Literal decimal digits
    Decimal,
}

/// Timestamp settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    /// Frames per second used for frame-count timestamps
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Interpretation of `HH:MM:SS:FF`
    #[serde(default)]
    pub colon_fraction: ColonFraction,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            colon_fraction: ColonFraction::default(),
        }
    }
}

impl TimingConfig {
    /// Timestamp parser matching these settings
    pub fn parser(&self) -> TimestampParser {
        let style = match self.colon_fraction {
            ColonFraction::Frames => FractionStyle::Frames(self.frame_rate),
            ColonFraction::Decimal => FractionStyle::Decimal,
        };
        TimestampParser::with_fraction_style(style)
    }
}

/// Output settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct OutputConfig {
    /// Format written when none is given on the command line
    #[serde(default)]
    pub default_format: SubtitleFormat,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_frame_rate() -> f64 {
    DEFAULT_FRAME_RATE
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.timing.frame_rate.is_finite() || self.timing.frame_rate <= 0.0 {
            return Err(anyhow!(
                "Frame rate must be a positive number, got {}",
                self.timing.frame_rate
            ));
        }

        let tolerance = self.consistency.overlap_tolerance_secs;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(anyhow!("Overlap tolerance must be zero or more seconds, got {}", tolerance));
        }

        let max_duration = self.consistency.max_duration_secs;
        if !max_duration.is_finite() || max_duration <= 0.0 {
            return Err(anyhow!("Maximum caption duration must be positive, got {}", max_duration));
        }

        Ok(())
    }

    /// Options used when parsing input files
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            parser: self.timing.parser(),
            consistency: self.consistency.clone(),
        }
    }
}
