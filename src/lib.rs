/*!
 * # pgnexport - chess.com game archive exporter
 *
 * A Rust library for turning chess.com PGN archives into a flat tabular
 * dataset, one row per game, with per-move sequences split by color.
 *
 * ## Features
 *
 * - Download every monthly archive of a chess.com account
 * - Segment concatenated PGN text into per-game blocks
 * - Normalize bracket-tagged metadata into a fixed tag set
 * - Decode both chess.com movetext dialects ("Let's Play!" and
 *   "Live Chess") into ordered white/black move lists
 * - Drop malformed blocks instead of failing the batch
 * - Export retained games as CSV with a fixed column order
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `pgn_processor`: PGN parsing and game record assembly
 * - `exporter`: CSV serialization of game records
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Archive source implementations:
 *   - `providers::chess_com`: chess.com public API client
 *   - `providers::mock`: In-memory source for tests
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
pub mod file_utils;
pub mod pgn_processor;
pub mod exporter;
pub mod app_controller;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use pgn_processor::{GameCollection, GameRecord, MoveDialect, MovetextOutcome};
pub use exporter::CsvExporter;
pub use errors::{AppError, ExportError, MovetextError, SourceError};
