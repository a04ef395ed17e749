// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use subconv::app_config::{self, Config};
use subconv::app_controller::{ConversionOutcome, Controller};
use subconv::formats::SubtitleFormat;

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Srt,
    Dfxp,
    Csv,
    Txt,
}

impl From<CliFormat> for SubtitleFormat {
    fn from(cli_format: CliFormat) -> Self {
        match cli_format {
            CliFormat::Srt => SubtitleFormat::Srt,
            CliFormat::Dfxp => SubtitleFormat::Dfxp,
            CliFormat::Csv => SubtitleFormat::Csv,
            CliFormat::Txt => SubtitleFormat::Txt,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every command that reads subtitles
#[derive(Args, Debug)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Read the input as this format instead of detecting it
    #[arg(long = "from", value_enum)]
    source_format: Option<CliFormat>,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output file or directory (defaults to next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format to write
    #[arg(short = 't', long = "to", value_enum)]
    target_format: Option<CliFormat>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input subtitle file
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Print every caption, not just the summary
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert subtitles between formats
    Convert(ConvertArgs),

    /// Parse and validate a file, then print what was found
    Inspect(InspectArgs),

    /// Generate shell completions for subconv
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subconv - subtitle format converter
///
/// Reads loosely structured subtitle text and writes clean, validated captions.
#[derive(Parser, Debug)]
#[command(name = "subconv")]
#[command(version)]
#[command(about = "Heuristic subtitle converter")]
#[command(long_about = "subconv reads SRT files, DFXP/TTML documents, CSV exports and plain transcripts with or without timestamps, repairs small timing overlaps and writes SRT, DFXP, CSV or TXT.

EXAMPLES:
    subconv convert talk.txt                    # Write talk.srt next to the input
    subconv convert talk.txt -t csv -o out/     # Write out/talk.csv
    subconv convert --from txt notes.csv        # Force plain-text parsing
    subconv convert -f /subtitles/ -t srt       # Convert a whole directory, overwriting
    subconv convert talk.srt -t dfxp            # Write talk.dfxp
    subconv inspect -v talk.srt                 # Show parsed captions
    subconv completions bash > subconv.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is lowered once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subconv", &mut std::io::stdout());
            Ok(())
        }
        Commands::Convert(args) => run_convert(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}

fn run_convert(options: ConvertArgs) -> Result<()> {
    let config = load_config(&options.common)?;
    let controller = Controller::with_config(config)?;

    let target_format = options.target_format.map(SubtitleFormat::from);
    let source_format = options.common.source_format.map(SubtitleFormat::from);

    if options.input_path.is_file() {
        let outcome = controller.run(
            &options.input_path,
            options.output.as_deref(),
            target_format,
            source_format,
            options.force_overwrite,
        )?;
        if let ConversionOutcome::Converted(path) = outcome {
            info!("Success: {}", path.display());
        }
    } else if options.input_path.is_dir() {
        if source_format.is_some() {
            warn!("--from is ignored for directories, formats are detected per file");
        }
        let summary = controller.run_folder(
            &options.input_path,
            options.output.as_deref(),
            target_format,
            options.force_overwrite,
        )?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) could not be converted", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {}", options.input_path.display()));
    }

    Ok(())
}

fn run_inspect(options: InspectArgs) -> Result<()> {
    let config = load_config(&options.common)?;
    let controller = Controller::with_config(config)?;

    let source_format = options.common.source_format.map(SubtitleFormat::from);
    let subtitles = controller.inspect(&options.input_file, source_format)?;

    print!("{}", subtitles);
    if options.verbose {
        for caption in subtitles.entries() {
            println!("{}", caption);
        }
    }

    Ok(())
}

// @loads: Configuration file, created with defaults when missing
fn load_config(options: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = options.log_level {
        log::set_max_level(app_config::LogLevel::from(cmd_log_level).to_level_filter());
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Update log level in config if specified via command line
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}
