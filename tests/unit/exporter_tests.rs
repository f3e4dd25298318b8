/*!
 * Tests for CSV export of game records
 */

use std::path::PathBuf;

use anyhow::Result;
use pgnexport::app_config::ExportConfig;
use pgnexport::exporter::CsvExporter;
use pgnexport::pgn_processor::GameCollection;

use crate::common;

fn parse(content: &str) -> GameCollection {
    GameCollection::parse_archive_string(PathBuf::from("test.pgn"), content)
}

/// Test the fixed export header
#[test]
fn test_header_withMoveColumns_shouldAppendThem() {
    let exporter = CsvExporter::new();
    let header = exporter.header();

    assert_eq!(header.len(), 25);
    assert_eq!(header[0], "Event");
    assert_eq!(header[7], "Tournament");
    assert_eq!(header[22], "Moves");
    assert_eq!(header[23], "whitemoves");
    assert_eq!(header[24], "blackmoves");
}

/// Test the header without the per-side move columns
#[test]
fn test_header_withoutMoveColumns_shouldStopAtMoves() {
    let config = ExportConfig {
        include_moves: false,
        ..ExportConfig::default()
    };
    let exporter = CsvExporter::from_config(&config);
    let header = exporter.header();

    assert_eq!(header.len(), 23);
    assert_eq!(header.last(), Some(&"Moves"));
}

/// Test serializing a decoded record
#[test]
fn test_to_csv_string_withDecodedRecord_shouldJoinMoves() -> Result<()> {
    let collection = parse(&common::live_chess_game());
    let exporter = CsvExporter::new();

    let csv = exporter.to_csv_string(&collection)?;
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Event,Site,Date,Round,White,Black,Result,Tournament"));
    assert!(lines[0].ends_with("Link,Moves,whitemoves,blackmoves"));

    let row = lines[1];
    assert!(row.starts_with("Live Chess,Chess.com,2021.05.01,-,alice,bob,1-0,-,"));
    // The Moves column is empty for a decoded record
    assert!(row.ends_with(",e4 Nf3,e5 over"));
    Ok(())
}

/// Test serializing a passthrough record keeps the raw movetext
#[test]
fn test_to_csv_string_withPassthroughRecord_shouldCarryRawMovetext() -> Result<()> {
    let game = common::game_block(&common::live_chess_tags(), "e4 e5 1-0");
    let collection = parse(&game);
    let exporter = CsvExporter::new();

    let csv = exporter.to_csv_string(&collection)?;
    let row = csv.lines().nth(1).unwrap();

    assert!(row.ends_with(",e4 e5 1-0,,"));
    Ok(())
}

/// Test row width stays fixed for a short record
#[test]
fn test_to_csv_string_withShortRecord_shouldPadColumns() -> Result<()> {
    let mut block = common::live_chess_tags().join("\n");
    block.push('\n');
    let collection = parse(&block);
    let exporter = CsvExporter::new();

    let csv = exporter.to_csv_string(&collection)?;
    let row = csv.lines().nth(1).unwrap();

    assert_eq!(row.split(',').count(), 25);
    Ok(())
}

/// Test writing a CSV file to disk, creating parent directories
#[test]
fn test_write_to_csv_withNestedPath_shouldCreateFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("data").join("alice_games.csv");

    let collection = parse(&common::live_chess_game());
    let exporter = CsvExporter::new();
    exporter.write_to_csv(&collection, &output)?;

    let content = std::fs::read_to_string(&output)?;
    assert!(content.starts_with("Event,"));
    assert_eq!(content.lines().count(), 2);
    Ok(())
}

/// Test exporting an empty collection still writes the header
#[test]
fn test_to_csv_string_withEmptyCollection_shouldWriteHeaderOnly() -> Result<()> {
    let collection = parse("");
    let exporter = CsvExporter::new();

    let csv = exporter.to_csv_string(&collection)?;

    assert_eq!(csv.lines().count(), 1);
    assert!(csv.starts_with("Event,"));
    Ok(())
}
