//! Logger setup.
//!
//! `env_logger` with an `info` default (override with `RUST_LOG`). Every run
//! also keeps a copy of its log in `<dir>/<command>_<YYYYMMDD_HHMMSS>.log`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use env_logger::{Env, Target, WriteStyle};

use crate::error::AppError;
use crate::io::create_file;

/// Writes every log line to stderr and to the run's log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

pub fn log_file_name(command: &str, stamp: chrono::NaiveDateTime) -> String {
    format!("{command}_{}.log", stamp.format("%Y%m%d_%H%M%S"))
}

/// Initialize the global logger; returns the log file path.
pub fn init(command: &str, dir: &Path) -> Result<PathBuf, AppError> {
    let path = dir.join(log_file_name(command, Local::now().naive_local()));
    let file = create_file(&path)?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(Tee { file })))
        .write_style(WriteStyle::Never)
        .try_init()
        .map_err(|e| AppError::input(format!("Failed to initialize logging: {e}")))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn log_file_is_named_after_command_and_time() {
        let stamp = NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(13, 2, 9)
            .unwrap();
        assert_eq!(log_file_name("wgi", stamp), "wgi_20260504_130209.log");
    }
}
