/*!
 * Archive source implementations.
 *
 * This module contains clients that supply raw PGN archive text:
 * - ChessCom: chess.com public API integration
 * - Mock: in-memory source for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::SourceError;

/// Common trait for all archive sources
///
/// This trait defines the interface that all source implementations must
/// follow, allowing the controller to fetch archives without knowing where
/// they come from.
#[async_trait]
pub trait ArchiveSource: Send + Sync + Debug {
    /// List the monthly archive URLs recorded for a user
    ///
    /// # Arguments
    /// * `username` - The account whose archives to list
    ///
    /// # Returns
    /// * `Result<Vec<String>, SourceError>` - One URL per month with games, oldest first
    async fn archive_urls(&self, username: &str) -> Result<Vec<String>, SourceError>;

    /// Fetch one monthly archive as concatenated PGN text
    ///
    /// # Arguments
    /// * `archive_url` - A URL previously returned by `archive_urls`
    ///
    /// # Returns
    /// * `Result<String, SourceError>` - The month's games in PGN form
    async fn fetch_pgn(&self, archive_url: &str) -> Result<String, SourceError>;

    /// Test the connection to the source
    ///
    /// # Returns
    /// * `Result<(), SourceError>` - Ok if the source answers for this user
    async fn test_connection(&self, username: &str) -> Result<(), SourceError>;
}

pub mod chess_com;
pub mod mock;
