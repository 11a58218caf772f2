use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
struct SimpleLogger {
    log_file: PathBuf,
    level: LevelFilter,
}

static LOGGER: OnceCell<SimpleLogger> = OnceCell::new();

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let log_entry = format!("{} {} - {}\n", timestamp, record.level(), record.args());

            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)
            {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

/// Sends every `log` record at or above `level` to `<dir>/log.txt`.
/// Only the first call installs a logger.
pub fn init(dir: &Path, level: LevelFilter) -> Result<(), SetLoggerError> {
    if let Err(e) = create_dir_all(dir) {
        eprintln!("Could not create log directory {}: {e}", dir.display());
    }

    let logger = LOGGER.get_or_init(|| SimpleLogger {
        log_file: dir.join("log.txt"),
        level,
    });

    log::set_logger(logger).map(|()| log::set_max_level(level))
}
