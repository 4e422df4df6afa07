use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug)]
struct SimpleLogger {
    log_path: PathBuf,
}

static LOGGER: OnceCell<SimpleLogger> = OnceCell::new();

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
            append_line(&self.log_path.join("log.txt"), &log_entry);
        }
    }

    fn flush(&self) {}
}

fn append_line(log_file: &std::path::Path, entry: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_file) {
        let _ = writeln!(file, "{entry}");
    }
}

pub fn init() -> Result<(), SetLoggerError> {
    let log_path = dir::home_dir()
        .expect("Failed to get home directory")
        .join("questweaver")
        .join("data");

    create_dir_all(&log_path).expect("Could not create log path");

    LOGGER
        .set(SimpleLogger { log_path })
        .expect("Logger already set");

    log::set_logger(LOGGER.get().unwrap()).map(|()| log::set_max_level(LevelFilter::Debug))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_append_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        append_line(&path, "INFO - first");
        append_line(&path, "DEBUG - second");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "INFO - first\nDEBUG - second\n");
    }
}
