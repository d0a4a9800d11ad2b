use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

/// Name of the log file, created in the system temp directory
pub const LOG_FILE_NAME: &str = "dfs-maze.log";

/// Log level picked from the `DEBUG` environment variable: `DEBUG=1` turns on debug logs.
fn max_level() -> Level {
    match std::env::var("DEBUG") {
        Ok(value) if value == "1" => Level::DEBUG,
        _ => Level::INFO,
    }
}

/// Sends tracing output to a file, since the terminal is taken by the maze.
/// Logs are flushed when the returned guard is dropped, so keep it alive until exit.
pub fn init_file_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(std::env::temp_dir(), LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let result = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(max_level())
        .try_init();
    if let Err(e) = result {
        eprintln!("Failed to set up logging: {}", e);
    }
    guard
}
