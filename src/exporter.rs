use anyhow::{Context, Result};
use csv::Writer;
use log::debug;
use std::path::Path;

use crate::app_config::ExportConfig;
use crate::pgn_processor::{GameCollection, GameRecord, TAG_FIELDS};

// @module: CSV serialization of game records

// Metadata columns before the movetext slot
const METADATA_COLUMNS: usize = TAG_FIELDS.len() - 1;

// Derived columns appended after the tag set
const MOVE_COLUMNS: [&str; 2] = ["whitemoves", "blackmoves"];

/// Writes game records as CSV with a fixed column order.
///
/// The header is the tag set; the `Moves` column is empty for decoded
/// records and carries the raw movetext for passthrough records. The two
/// per-side move columns hold space-joined tokens and can be switched off.
pub struct CsvExporter {
    include_moves: bool,
}

impl CsvExporter {
    /// Create an exporter that writes the per-side move columns
    pub fn new() -> Self {
        CsvExporter {
            include_moves: true,
        }
    }

    /// Create an exporter from export configuration
    pub fn from_config(config: &ExportConfig) -> Self {
        CsvExporter {
            include_moves: config.include_moves,
        }
    }

    /// Column names in export order
    pub fn header(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = TAG_FIELDS.to_vec();
        if self.include_moves {
            columns.extend(MOVE_COLUMNS);
        }
        columns
    }

    /// Write a collection to a CSV file
    pub fn write_to_csv<P: AsRef<Path>>(
        &self,
        collection: &GameCollection,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut writer = Writer::from_path(path)
            .with_context(|| format!("Failed to create export file: {}", path.display()))?;
        self.write_records(&mut writer, collection)?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush export file: {}", path.display()))?;

        debug!(
            "Exported {} records to {}",
            collection.records.len(),
            path.display()
        );
        Ok(())
    }

    /// Serialize a collection to an in-memory CSV string - used by tests
    /// and external consumers
    #[allow(dead_code)]
    pub fn to_csv_string(&self, collection: &GameCollection) -> Result<String> {
        let mut writer = Writer::from_writer(Vec::new());
        self.write_records(&mut writer, collection)?;
        let bytes = writer
            .into_inner()
            .context("Failed to finish in-memory export")?;
        String::from_utf8(bytes).context("Exported CSV was not valid UTF-8")
    }

    fn write_records<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        collection: &GameCollection,
    ) -> Result<()> {
        writer
            .write_record(self.header())
            .context("Failed to write CSV header")?;

        for record in &collection.records {
            writer
                .write_record(self.row(record))
                .with_context(|| format!("Failed to write CSV row for {}", record))?;
        }
        Ok(())
    }

    fn row(&self, record: &GameRecord) -> Vec<String> {
        let mut row = Vec::with_capacity(METADATA_COLUMNS + 3);
        for idx in 0..METADATA_COLUMNS {
            row.push(record.tag_values.get(idx).cloned().unwrap_or_default());
        }
        // The Moves slot only carries text when decoding bailed out
        row.push(record.raw_movetext.clone().unwrap_or_default());
        if self.include_moves {
            row.push(record.white_moves.join(" "));
            row.push(record.black_moves.join(" "));
        }
        row
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}
