//! Log sinks
//!
//! Info and access lines go to stdout or an append-mode file; warnings and
//! errors to stderr or a second file. Writes are serialized per sink.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

enum Sink {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl Sink {
    /// Append to `path` (creating parent directories), or use `console`
    fn append_or(path: Option<&str>, console: Self) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(console);
        };
        if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::File(Mutex::new(file)))
    }

    fn line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                // A poisoned lock or a failed write drops the line
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{message}");
                }
            }
        }
    }
}

pub struct LogWriter {
    info: Sink,
    error: Sink,
}

impl LogWriter {
    fn open(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            info: Sink::append_or(access_log_file, Sink::Stdout)?,
            error: Sink::append_or(error_log_file, Sink::Stderr)?,
        })
    }

    pub fn write_info(&self, message: &str) {
        self.info.line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.line(message);
    }
}

/// Install the process-wide writer
///
/// # Errors
///
/// Fails if a log file cannot be opened or a writer is already installed.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::open(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "logger already initialized",
        )
    })
}

pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
