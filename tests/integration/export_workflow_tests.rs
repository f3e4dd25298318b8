/*!
 * End-to-end export workflow tests
 */

use std::path::Path;

use anyhow::Result;
use pgnexport::app_config::Config;
use pgnexport::app_controller::Controller;
use pgnexport::providers::mock::MockArchiveSource;

use crate::common;

/// Build a config whose output lands in the given directory
fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.username = "mock".to_string();
    config.export.output_template = output_dir
        .join("{username}_games.csv")
        .to_string_lossy()
        .to_string();
    config
}

/// Test the full download-parse-export workflow against the mock source
#[tokio::test]
async fn test_run_with_source_withWorkingMock_shouldWriteCsv() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = test_config(temp_dir.path());
    let output_path = config.export.output_path("mock");

    let controller = Controller::with_config(config)?;
    controller
        .run_with_source(&MockArchiveSource::working(), false)
        .await?;

    let content = std::fs::read_to_string(&output_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Event,Site,"));
    assert!(lines[1].starts_with("Live Chess,Chess.com,"));
    Ok(())
}

/// Test the overwrite guard: without force the existing file is kept
#[tokio::test]
async fn test_run_with_source_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = test_config(temp_dir.path());
    let output_path = config.export.output_path("mock");
    std::fs::write(&output_path, "sentinel")?;

    let controller = Controller::with_config(config)?;

    controller
        .run_with_source(&MockArchiveSource::working(), false)
        .await?;
    assert_eq!(std::fs::read_to_string(&output_path)?, "sentinel");

    controller
        .run_with_source(&MockArchiveSource::working(), true)
        .await?;
    assert!(std::fs::read_to_string(&output_path)?.starts_with("Event,"));
    Ok(())
}

/// Test that a configured download directory keeps the monthly files
#[tokio::test]
async fn test_run_with_source_withDownloadDir_shouldKeepMonthlyFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = test_config(temp_dir.path());
    let download_dir = temp_dir.path().join("pgn");
    config.archive.download_dir = Some(download_dir.clone());

    let controller = Controller::with_config(config)?;
    controller
        .run_with_source(&MockArchiveSource::working(), false)
        .await?;

    // The mock lists .../games/2021/05, staged as 202105.pgn
    assert!(download_dir.join("202105.pgn").exists());
    Ok(())
}

/// Test local export of a single archive file
#[tokio::test]
async fn test_run_local_withArchiveFile_shouldExportEveryGame() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let archive = format!("{}{}", common::live_chess_game(), common::lets_play_game());
    let input = common::create_test_file(&dir, "games.pgn", &archive)?;

    let config = test_config(temp_dir.path());
    let output_path = config.export.output_path("mock");

    let controller = Controller::with_config(config)?;
    controller.run_local(&input, false).await?;

    let content = std::fs::read_to_string(&output_path)?;
    assert_eq!(content.lines().count(), 3);
    Ok(())
}

/// Test local export of a directory of monthly archives
#[tokio::test]
async fn test_run_local_withArchiveDirectory_shouldMergeInNameOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("months");
    std::fs::create_dir_all(&input_dir)?;
    common::create_test_file(&input_dir, "202105.pgn", &common::live_chess_game())?;
    common::create_test_file(&input_dir, "202104.pgn", &common::lets_play_game())?;

    let config = test_config(temp_dir.path());
    let output_path = config.export.output_path("mock");

    let controller = Controller::with_config(config)?;
    controller.run_local(&input_dir, false).await?;

    let content = std::fs::read_to_string(&output_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    // April's Let's Play game sorts before May's Live Chess game
    assert!(lines[1].starts_with("Let's Play!,"));
    assert!(lines[2].starts_with("Live Chess,"));
    Ok(())
}

/// Test local export with a missing input path
#[tokio::test]
async fn test_run_local_withMissingInput_shouldError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = test_config(temp_dir.path());

    let controller = Controller::with_config(config)?;
    let result = controller
        .run_local(&temp_dir.path().join("nope.pgn"), false)
        .await;

    assert!(result.is_err());
    Ok(())
}

/// Test local export of a file that is not a PGN archive
#[tokio::test]
async fn test_run_local_withNonPgnFile_shouldError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let input = common::create_test_file(&dir, "notes.txt", "not an archive\n")?;

    let config = test_config(temp_dir.path());
    let controller = Controller::with_config(config)?;

    assert!(controller.run_local(&input, false).await.is_err());
    Ok(())
}
