/*!
 * Tests for archive source implementations
 */

use std::path::PathBuf;

use anyhow::Result;
use pgnexport::pgn_processor::{GameCollection, MovetextOutcome};
use pgnexport::providers::ArchiveSource;
use pgnexport::providers::chess_com::{ArchivesResponse, ChessComClient};
use pgnexport::providers::mock::{MockArchive, MockArchiveSource, SAMPLE_PGN};

/// Test deserialization of the archives listing payload
#[test]
fn test_archives_response_fromJson_shouldListUrls() -> Result<()> {
    let json = r#"{
        "archives": [
            "https://api.chess.com/pub/player/alice/games/2021/04",
            "https://api.chess.com/pub/player/alice/games/2021/05"
        ]
    }"#;

    let response: ArchivesResponse = serde_json::from_str(json)?;

    assert_eq!(response.archives.len(), 2);
    assert!(response.archives[0].ends_with("2021/04"));
    Ok(())
}

/// Test file name derivation for every listed archive
#[test]
fn test_archive_file_name_overListing_shouldSortChronologically() -> Result<()> {
    let urls = [
        "https://api.chess.com/pub/player/alice/games/2020/12",
        "https://api.chess.com/pub/player/alice/games/2021/01",
        "https://api.chess.com/pub/player/alice/games/2021/11",
    ];

    let mut names: Vec<String> = urls
        .iter()
        .map(|url| ChessComClient::archive_file_name(url))
        .collect::<Result<_, _>>()?;
    names.sort();

    assert_eq!(names, vec!["202012.pgn", "202101.pgn", "202111.pgn"]);
    Ok(())
}

/// Test that the mock's sample archive parses into a decoded record
#[tokio::test]
async fn test_sample_pgn_throughParser_shouldDecode() -> Result<()> {
    let source = MockArchiveSource::working();
    let urls = source.archive_urls("mock").await?;
    let pgn = source.fetch_pgn(&urls[0]).await?;

    let collection = GameCollection::parse_archive_string(PathBuf::from("mock.pgn"), &pgn);

    assert_eq!(collection.records.len(), 1);
    let record = &collection.records[0];
    assert_eq!(record.outcome, MovetextOutcome::Decoded);
    assert_eq!(record.tag("Event"), Some("Live Chess"));
    assert_eq!(record.tag("Tournament"), Some("-"));
    assert_eq!(record.white_moves, vec!["e4", "Nf3", "d4", "Nxd4"]);
    assert_eq!(record.black_moves, vec!["c5", "Nc6", "cxd4", "over"]);
    Ok(())
}

/// Test a mock configured with several months of archives
#[tokio::test]
async fn test_mock_withSeveralMonths_shouldServeEach() -> Result<()> {
    let source = MockArchiveSource::working().with_archives(vec![
        MockArchive {
            url: "https://api.chess.com/pub/player/mock/games/2021/04".to_string(),
            pgn: SAMPLE_PGN.to_string(),
        },
        MockArchive {
            url: "https://api.chess.com/pub/player/mock/games/2021/05".to_string(),
            pgn: SAMPLE_PGN.to_string(),
        },
    ]);

    let urls = source.archive_urls("mock").await?;
    assert_eq!(urls.len(), 2);

    for url in &urls {
        let pgn = source.fetch_pgn(url).await?;
        assert!(pgn.contains("[Event \"Live Chess\"]"));
    }
    Ok(())
}

/// Test connection probing against the mock
#[tokio::test]
async fn test_test_connection_withWorkingAndFailing_shouldReflectBehavior() {
    assert!(MockArchiveSource::working().test_connection("mock").await.is_ok());
    assert!(MockArchiveSource::failing().test_connection("mock").await.is_err());
}
