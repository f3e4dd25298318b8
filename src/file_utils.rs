use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Bracket-tagged metadata line, the signature of PGN content
static PGN_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\[\w+\s+".*"\]\s*$"#).unwrap()
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Concatenate a set of archive files into one string, in file name
    /// order so monthly downloads come out chronologically.
    pub fn concatenate_files(paths: &[PathBuf]) -> Result<String> {
        let mut ordered: Vec<&PathBuf> = paths.iter().collect();
        ordered.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));

        let mut merged = String::new();
        for path in ordered {
            let content = Self::read_to_string(path)?;
            merged.push_str(&content);
            // Keep blocks separated when a file lacks a trailing newline
            if !content.ends_with('\n') {
                merged.push('\n');
            }
        }

        debug!("Concatenated {} archive files", paths.len());
        Ok(merged)
    }

    /// Detect if a file is a PGN archive
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        // Check file extension
        if let Some(ext) = path.extension() {
            if ext.to_string_lossy().eq_ignore_ascii_case("pgn") {
                return Ok(FileType::Pgn);
            }
        }

        // Fall back to examining file contents
        if let Ok(content) = fs::read_to_string(path) {
            let first_line = content.lines().find(|line| !line.trim().is_empty());
            if let Some(line) = first_line {
                if PGN_TAG_REGEX.is_match(line.trim()) {
                    return Ok(FileType::Pgn);
                }
            }
        }

        // Default to unknown if we couldn't determine the type
        Ok(FileType::Unknown)
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// PGN archive file
    Pgn,
    /// Unknown file type
    Unknown,
}
