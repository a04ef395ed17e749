use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::formats::SubtitleFormat;
use crate::subtitle_processor::SubtitleCollection;

// @module: Application controller for subtitle conversion

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Converted and written to the path
    Converted(PathBuf),
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Counts reported after converting a folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for subtitle conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert one file.
    ///
    /// `output` may name a file or an existing directory; without it the
    /// result is written next to the input.
    pub fn run(
        &self,
        input_file: &Path,
        output: Option<&Path>,
        target_format: Option<SubtitleFormat>,
        source_format: Option<SubtitleFormat>,
        force_overwrite: bool,
    ) -> Result<ConversionOutcome> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {}", input_file.display()));
        }

        let target_format = target_format.unwrap_or(self.config.output.default_format);
        let output_path = self.output_path_for(input_file, output, target_format);

        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {}, output already exists (use -f to force overwrite)",
                output_path.display()
            );
            return Ok(ConversionOutcome::Skipped(output_path));
        }

        let subtitles = SubtitleCollection::from_file(input_file, source_format, &self.config.conversion_options())?;
        subtitles.write_to_file(&output_path, target_format)?;

        info!(
            "Converted {} captions to {} in {}",
            subtitles.len(),
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(ConversionOutcome::Converted(output_path))
    }

    /// Convert every subtitle file under a directory.
    ///
    /// Files already in the target format are left alone unless an output
    /// directory is given. A failing file is counted and does not stop the
    /// run.
    pub fn run_folder(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        target_format: Option<SubtitleFormat>,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {}", input_dir.display()));
        }

        let target_format = target_format.unwrap_or(self.config.output.default_format);
        let files: Vec<PathBuf> = FileManager::find_subtitle_files(input_dir)?
            .into_iter()
            .filter(|file| output_dir.is_some() || Self::format_of(file) != Some(target_format))
            .collect();

        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {}", input_dir.display()));
        }

        let folder_pb = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();

        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Converting: {}", file_name));

            // Mirror the input tree below the output directory
            let target_dir = match output_dir {
                Some(out) => {
                    let relative = file
                        .parent()
                        .and_then(|parent| parent.strip_prefix(input_dir).ok())
                        .unwrap_or_else(|| Path::new(""));
                    Some(out.join(relative))
                }
                None => None,
            };

            match self.run(file, target_dir.as_deref(), Some(target_format), None, force_overwrite) {
                Ok(ConversionOutcome::Converted(_)) => summary.converted += 1,
                Ok(ConversionOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error converting {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder conversion complete");

        info!(
            "Folder conversion completed in {}: {} converted, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.converted,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }

    /// Parse and validate a file without writing anything
    pub fn inspect(&self, input_file: &Path, source_format: Option<SubtitleFormat>) -> Result<SubtitleCollection> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {}", input_file.display()));
        }

        SubtitleCollection::from_file(input_file, source_format, &self.config.conversion_options())
    }

    fn output_path_for(&self, input_file: &Path, output: Option<&Path>, target_format: SubtitleFormat) -> PathBuf {
        let extension = target_format.extension();
        let path = match output {
            Some(out) if FileManager::dir_exists(out) || Self::format_of(out).is_none() => {
                FileManager::generate_output_path(input_file, out, extension)
            }
            Some(out) => out.to_path_buf(),
            None => {
                let dir = input_file.parent().unwrap_or_else(|| Path::new(""));
                FileManager::generate_output_path(input_file, dir, extension)
            }
        };
        debug!("Output path for {}: {}", input_file.display(), path.display());
        path
    }

    fn format_of(path: &Path) -> Option<SubtitleFormat> {
        path.extension()
            .and_then(|ext| SubtitleFormat::from_extension(&ext.to_string_lossy()))
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
