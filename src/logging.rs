//! Logging setup for the SubDB CLI
//!
//! Library code only talks to the `log` facade. The binary installs either
//! `env_logger` on stderr or an asynchronous file logger whose writer thread
//! keeps disk I/O off the download path.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

/// Messages handled by the writer thread
enum LogMessage {
    Line(String),
    Flush(mpsc::Sender<()>),
}

/// `log` backend that appends to a file from a background thread
pub struct AsyncLogger {
    sender: Mutex<mpsc::Sender<LogMessage>>,
    level: LevelFilter,
}

impl AsyncLogger {
    /// Open (or create) `log_path` in append mode and start the writer thread
    pub fn new(log_path: &Path, level: LevelFilter) -> std::io::Result<Self> {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        let (tx, rx) = mpsc::channel::<LogMessage>();

        std::thread::spawn(move || {
            let mut file = std::io::BufWriter::new(log_file);
            for msg in rx {
                match msg {
                    LogMessage::Line(line) => {
                        let _ = writeln!(file, "{}", line);
                    }
                    LogMessage::Flush(ack) => {
                        let _ = file.flush();
                        let _ = ack.send(());
                    }
                }
            }
            let _ = file.flush();
        });

        Ok(Self {
            sender: Mutex::new(tx),
            level,
        })
    }

    fn send(&self, msg: LogMessage) {
        if let Ok(sender) = self.sender.lock() {
            let _ = sender.send(msg);
        }
    }
}

impl Log for AsyncLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        self.send(LogMessage::Line(format!(
            "[{} {} {}] {}",
            record.level(),
            timestamp,
            record.target(),
            record.args()
        )));
    }

    /// Blocks until the writer thread has flushed everything sent so far
    fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        self.send(LogMessage::Flush(ack_tx));
        let _ = ack_rx.recv();
    }
}

/// Default log file location: XDG cache dir, falling back to `~/.subdb`
pub fn default_log_path() -> std::io::Result<PathBuf> {
    #[cfg(windows)]
    let app_dir = {
        let exe_path = std::env::current_exe()?;
        exe_path
            .parent()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "Failed to get executable directory")
            })?
            .to_path_buf()
    };

    #[cfg(not(windows))]
    let app_dir = match xdg::BaseDirectories::new() {
        Ok(xdg_dirs) => xdg_dirs.get_cache_home().join("subdb"),
        Err(_) => dirs::home_dir()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "Failed to get home directory")
            })?
            .join(".subdb"),
    };

    std::fs::create_dir_all(&app_dir)?;
    Ok(app_dir.join("subdb.log"))
}

/// Where log records go
pub enum LogTarget {
    /// `env_logger` on stderr, `RUST_LOG` overrides the level
    Console,
    File(PathBuf),
}

/// Install the global logger. Calling it twice keeps the first logger.
pub fn setup_logging(target: LogTarget, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    match target {
        LogTarget::Console => {
            let default_filter = if verbose { "debug" } else { "warn" };
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(default_filter),
            )
            .format_timestamp_secs()
            .try_init();
        }
        LogTarget::File(path) => {
            let logger = AsyncLogger::new(&path, level)?;
            if log::set_boxed_logger(Box::new(logger)).is_ok() {
                log::set_max_level(level);
            }
        }
    }
    Ok(())
}

/// Flush whatever logger is installed
pub fn shutdown_logging() {
    log::logger().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logger_writes_and_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let logger = AsyncLogger::new(&path, LevelFilter::Info).unwrap();

        logger.log(
            &Record::builder()
                .level(log::Level::Info)
                .target("subdb::client")
                .args(format_args!("hello {}", 42))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(log::Level::Debug)
                .target("subdb::client")
                .args(format_args!("hidden"))
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("subdb::client] hello 42"));
        assert!(content.starts_with("[INFO "));
        assert!(!content.contains("hidden"));
    }
}
