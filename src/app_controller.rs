use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::exporter::CsvExporter;
use crate::file_utils::{FileManager, FileType};
use crate::pgn_processor::GameCollection;
use crate::providers::ArchiveSource;
use crate::providers::chess_com::ChessComClient;

// @module: Application controller for archive export

/// Main application controller for PGN archive export
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.username = "testuser".to_string();
        Self::with_config(config)
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.username.is_empty()
    }

    /// Download every monthly archive for the configured user and export
    /// them as one CSV.
    pub async fn run(&self, force_overwrite: bool) -> Result<()> {
        let client = ChessComClient::new(
            &self.config.archive.endpoint,
            self.config.archive.timeout_secs,
        );
        self.run_with_source(&client, force_overwrite).await
    }

    /// Run the full workflow against any archive source
    pub async fn run_with_source(
        &self,
        source: &dyn ArchiveSource,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        let output_path = self.output_path(force_overwrite)?;
        let Some(output_path) = output_path else {
            return Ok(());
        };

        let (archive_dir, content) = self.download_archives(source).await?;
        if content.trim().is_empty() {
            warn!("No games found for user '{}'", self.config.username);
            return Ok(());
        }

        let collection = GameCollection::parse_archive_string(archive_dir, &content);
        self.export_collection(&collection, &output_path)?;

        info!(
            "Export complete: {} games -> {} in {}",
            collection.records.len(),
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(())
    }

    /// Export a local PGN archive file, or a directory of monthly archive
    /// files, without touching the network.
    pub async fn run_local(&self, input_path: &Path, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        let output_path = self.output_path(force_overwrite)?;
        let Some(output_path) = output_path else {
            return Ok(());
        };

        let content = if input_path.is_file() {
            match FileManager::detect_file_type(input_path)? {
                FileType::Pgn => FileManager::read_to_string(input_path)?,
                FileType::Unknown => {
                    return Err(anyhow::anyhow!(
                        "Input does not look like a PGN archive: {:?}",
                        input_path
                    ));
                }
            }
        } else if input_path.is_dir() {
            let files = FileManager::find_files(input_path, "pgn")?;
            if files.is_empty() {
                warn!("No .pgn files found in directory: {:?}", input_path);
                return Ok(());
            }
            info!("Merging {} archive files from {:?}", files.len(), input_path);
            FileManager::concatenate_files(&files)?
        } else {
            return Err(anyhow::anyhow!(
                "Input path does not exist: {:?}",
                input_path
            ));
        };

        let collection = GameCollection::parse_archive_string(input_path.to_path_buf(), &content);
        self.export_collection(&collection, &output_path)?;

        info!(
            "Export complete: {} games -> {} in {}",
            collection.records.len(),
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(())
    }

    /// Resolve the output path, honoring the overwrite guard. `None` means
    /// the export was skipped.
    fn output_path(&self, force_overwrite: bool) -> Result<Option<PathBuf>> {
        let output_path = self.config.export.output_path(&self.config.username);
        if output_path.exists() && !force_overwrite {
            // Skip if the export already exists and no force flag
            warn!(
                "Skipping export, output already exists (use -f to force overwrite): {:?}",
                output_path
            );
            return Ok(None);
        }
        Ok(Some(output_path))
    }

    /// Download all monthly archives to a staging directory and merge them
    /// in chronological (file name) order.
    async fn download_archives(&self, source: &dyn ArchiveSource) -> Result<(PathBuf, String)> {
        let username = &self.config.username;
        let urls = source
            .archive_urls(username)
            .await
            .with_context(|| format!("Failed to list archives for '{}'", username))?;

        if urls.is_empty() {
            return Ok((PathBuf::new(), String::new()));
        }
        info!("Downloading {} monthly archives for '{}'", urls.len(), username);

        // Stage downloads on disk; a configured directory persists them,
        // otherwise they live in a temp dir for the duration of the run.
        let mut tempdir_guard = None;
        let staging_dir = match &self.config.archive.download_dir {
            Some(dir) => {
                FileManager::ensure_dir(dir)?;
                dir.clone()
            }
            None => {
                let tempdir = tempfile::tempdir().context("Failed to create staging directory")?;
                let path = tempdir.path().to_path_buf();
                tempdir_guard = Some(tempdir);
                path
            }
        };

        let progress_bar = ProgressBar::new(urls.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} archives ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Downloading archives");

        let results = stream::iter(urls.into_iter().map(|url| {
            let progress_bar = progress_bar.clone();
            async move {
                let result = source.fetch_pgn(&url).await;
                progress_bar.inc(1);
                (url, result)
            }
        }))
        .buffer_unordered(self.config.archive.concurrent_downloads)
        .collect::<Vec<_>>()
        .await;
        progress_bar.finish_and_clear();

        let mut saved = Vec::new();
        let mut errors = Vec::new();
        for (url, result) in results {
            match result {
                Ok(pgn) => {
                    let file_name = match ChessComClient::archive_file_name(&url) {
                        Ok(name) => name,
                        Err(e) => {
                            warn!("Could not name archive download: {}", e);
                            format!("archive{:03}.pgn", saved.len())
                        }
                    };
                    let path = staging_dir.join(file_name);
                    FileManager::write_to_file(&path, &pgn)?;
                    debug!("Saved {} -> {:?}", url, path);
                    saved.push(path);
                }
                Err(e) => errors.push(format!("{}: {}", url, e)),
            }
        }

        if !errors.is_empty() {
            return Err(anyhow::anyhow!(
                "Failed to download {} archive(s): {}",
                errors.len(),
                errors.join("; ")
            ));
        }

        let merged = FileManager::concatenate_files(&saved)?;
        drop(tempdir_guard);
        Ok((staging_dir, merged))
    }

    /// Write a parsed collection through the CSV exporter
    fn export_collection(&self, collection: &GameCollection, output_path: &Path) -> Result<()> {
        if collection.dropped_blocks > 0 {
            info!(
                "{} malformed game blocks were dropped before export",
                collection.dropped_blocks
            );
        }
        let exporter = CsvExporter::from_config(&self.config.export);
        exporter.write_to_csv(collection, output_path)
    }

    /// Format a duration in a human-readable way
    fn format_duration(duration: std::time::Duration) -> String {
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
