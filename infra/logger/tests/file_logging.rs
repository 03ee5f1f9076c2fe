use std::fs;
use std::time::Duration;
use svcd_logger::Logger;
use tempfile::tempdir;

#[test]
fn json_file_logging_writes_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("integration-file-logging")
        .console(false)
        .json(true)
        .directory(Some(&log_dir))
        .init()?;
    assert!(logger.writes_files());

    tracing::info!(domain = "customer-offer", "hello from integration test");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    assert!(contents.contains("\"domain\":\"customer-offer\""), "{contents}");
    Ok(())
}
