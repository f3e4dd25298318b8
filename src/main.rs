// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod exporter;
mod file_utils;
mod pgn_processor;
mod providers;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export chess.com games to CSV (default command)
    Export(ExportArgs),

    /// Generate shell completions for pgnexport
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// chess.com username whose games are exported
    #[arg(value_name = "USERNAME")]
    username: Option<String>,

    /// Local PGN archive file or directory to export instead of downloading
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output CSV path (overrides the configured template)
    #[arg(short, long)]
    output: Option<String>,

    /// Keep the downloaded monthly archives on disk
    #[arg(short, long)]
    keep_downloads: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// pgnexport - chess.com game archive exporter
///
/// Downloads every monthly PGN archive of a chess.com account and flattens
/// it into a CSV dataset, one row per game, with per-side move lists.
#[derive(Parser, Debug)]
#[command(name = "pgnexport")]
#[command(version = "0.3.0")]
#[command(about = "Export chess.com game archives to CSV")]
#[command(long_about = "pgnexport downloads chess.com PGN archives and flattens them into a CSV dataset.

EXAMPLES:
    pgnexport magnuscarlsen                    # Download and export using default config
    pgnexport -f magnuscarlsen                 # Force overwrite an existing CSV
    pgnexport -i games.pgn magnuscarlsen       # Export a local archive, no network
    pgnexport -i data/pgn/ magnuscarlsen       # Merge and export a directory of archives
    pgnexport -k magnuscarlsen                 # Keep the monthly downloads on disk
    pgnexport --log-level debug magnuscarlsen  # Verbose parse diagnostics
    pgnexport completions bash > pgnexport.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// chess.com username whose games are exported
    #[arg(value_name = "USERNAME")]
    username: Option<String>,

    /// Local PGN archive file or directory to export instead of downloading
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output CSV path (overrides the configured template)
    #[arg(short, long)]
    output: Option<String>,

    /// Keep the downloaded monthly archives on disk
    #[arg(short, long)]
    keep_downloads: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI color code for log level
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
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pgnexport", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Export(args)) => run_export(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let export_args = ExportArgs {
                username: cli.username,
                input: cli.input,
                force_overwrite: cli.force_overwrite,
                output: cli.output,
                keep_downloads: cli.keep_downloads,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_export(export_args).await
        }
    }
}

async fn run_export(options: ExportArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(username) = &options.username {
        config.username = username.clone();
    }
    if let Some(output) = &options.output {
        config.export.output_template = output.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if options.keep_downloads && config.archive.download_dir.is_none() {
        config.archive.download_dir = Some(PathBuf::from(format!("data/pgn/{}", config.username)));
    }

    // Validate the configuration after loading and overriding
    config
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    // Run against a local archive when one was given, the API otherwise
    if let Some(input_path) = &options.input {
        controller
            .run_local(input_path, options.force_overwrite)
            .await
    } else {
        controller.run(options.force_overwrite).await
    }
}
