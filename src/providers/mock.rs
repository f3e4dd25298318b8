/*!
 * Mock archive source for testing.
 *
 * This module provides a mock source that simulates different behaviors:
 * - `MockArchiveSource::working()` - Always succeeds with a fixture archive
 * - `MockArchiveSource::failing()` - Always fails with an error
 * - `MockArchiveSource::empty()` - Answers with no archives at all
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::SourceError;
use crate::providers::ArchiveSource;

/// A month of games held by the mock
#[derive(Debug, Clone)]
pub struct MockArchive {
    /// URL the month is listed under
    pub url: String,
    /// PGN text served for that URL
    pub pgn: String,
}

/// Behavior mode for the mock source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with the configured archives
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Lists no archives at all
    Empty,
    /// Simulates slow responses (for timeout testing)
    Slow { delay_ms: u64 },
}

/// One complete Live Chess game in chess.com export form
pub const SAMPLE_PGN: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[Date "2021.05.01"]
[Round "-"]
[White "arademirhan"]
[Black "hikaaru"]
[Result "1-0"]
[CurrentPosition "r1bqkbnr/pppp1ppp/2n5/8/3NP3/8/PPP2PPP/RNBQKB1R b KQkq -"]
[Timezone "UTC"]
[ECO "B32"]
[ECOUrl "https://www.chess.com/openings/Sicilian-Defense-Open"]
[UTCDate "2021.05.01"]
[UTCTime "17:52:04"]
[WhiteElo "912"]
[BlackElo "905"]
[TimeControl "600"]
[Termination "arademirhan won on time"]
[StartTime "17:52:04"]
[EndDate "2021.05.01"]
[EndTime "18:01:22"]
[Link "https://www.chess.com/game/live/13591051937"]

1. e4 {[%clk 0:09:59.9]} 1... c5 {[%clk 0:09:58.1]} 2. Nf3 {[%clk 0:09:57.2]} 2... Nc6 {[%clk 0:09:55.0]} 3. d4 {[%clk 0:09:54.3]} 3... cxd4 {[%clk 0:09:52.7]} 4. Nxd4 {[%clk 0:09:51.6]} 1-0
"#;

/// Mock archive source for testing fetch behavior
#[derive(Debug)]
pub struct MockArchiveSource {
    /// Behavior mode
    behavior: MockBehavior,
    /// Archives served by this mock
    archives: Vec<MockArchive>,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
}

impl MockArchiveSource {
    /// Create a new mock source with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            archives: vec![MockArchive {
                url: "https://api.chess.com/pub/player/mock/games/2021/05".to_string(),
                pgn: SAMPLE_PGN.to_string(),
            }],
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock source serving the sample archive
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock source
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock source that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock source that lists no archives
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Replace the served archives
    pub fn with_archives(mut self, archives: Vec<MockArchive>) -> Self {
        self.archives = archives;
        self
    }

    /// Number of requests the mock has answered so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn next_failure(&self) -> Option<SourceError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Failing => Some(SourceError::ApiError {
                status_code: 500,
                message: "Simulated source failure".to_string(),
            }),
            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Some(SourceError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl Clone for MockArchiveSource {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            archives: self.archives.clone(),
            request_count: Arc::clone(&self.request_count),
        }
    }
}

#[async_trait]
impl ArchiveSource for MockArchiveSource {
    async fn archive_urls(&self, _username: &str) -> Result<Vec<String>, SourceError> {
        if let Some(error) = self.next_failure() {
            return Err(error);
        }
        if let MockBehavior::Slow { delay_ms } = self.behavior {
            tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
        }
        if self.behavior == MockBehavior::Empty {
            return Ok(Vec::new());
        }
        Ok(self.archives.iter().map(|a| a.url.clone()).collect())
    }

    async fn fetch_pgn(&self, archive_url: &str) -> Result<String, SourceError> {
        if let Some(error) = self.next_failure() {
            return Err(error);
        }
        if let MockBehavior::Slow { delay_ms } = self.behavior {
            tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
        }
        self.archives
            .iter()
            .find(|a| a.url == archive_url)
            .map(|a| a.pgn.clone())
            .ok_or_else(|| SourceError::ApiError {
                status_code: 404,
                message: format!("No such archive: {}", archive_url),
            })
    }

    async fn test_connection(&self, _username: &str) -> Result<(), SourceError> {
        match self.behavior {
            MockBehavior::Failing => Err(SourceError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
