//! Rolling Logger
//!
//! Installs a `tracing` subscriber that writes to `<log_dir>/<app_name>.log`,
//! rotating the file by size, and keeps the most recent lines in memory.
//! Records sent through the `log` facade end up in the same file.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

pub use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, format, time::FormatTime, MakeWriter};
use tracing_subscriber::prelude::*;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub app_name: String,
    /// Rotate once the active file would grow past this size
    pub max_bytes: u64,
    /// Rotated files to keep (`.1` newest … `.N` oldest)
    pub max_files: usize,
    /// Lines kept in the in-memory buffer
    pub buffer_lines: usize,
    pub level: LevelFilter,
    /// Also print to stderr
    pub echo_stderr: bool,
}

impl LoggerConfig {
    pub fn new(log_dir: impl AsRef<Path>, app_name: &str) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes: 1024 * 1024,
            max_files: 3,
            buffer_lines: 200,
            level: LevelFilter::INFO,
            echo_stderr: true,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(format!("{}.log", self.app_name))
    }
}

#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
    AlreadyInitialized,
    NotInitialized,
    Subscriber(String),
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggerError::Io(e) => write!(f, "log file error: {}", e),
            LoggerError::AlreadyInitialized => write!(f, "logger already initialized"),
            LoggerError::NotInitialized => write!(f, "logger not initialized"),
            LoggerError::Subscriber(msg) => write!(f, "cannot install subscriber: {}", msg),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

/// Local wall-clock timestamps
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

struct RollingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_files: usize,
    recent: VecDeque<String>,
    buffer_lines: usize,
    partial: String,
}

impl RollingFile {
    fn open(config: &LoggerConfig) -> io::Result<Self> {
        std::fs::create_dir_all(&config.log_dir)?;
        let path = config.log_path();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            written,
            max_bytes: config.max_bytes.max(1),
            max_files: config.max_files,
            recent: VecDeque::with_capacity(config.buffer_lines),
            buffer_lines: config.buffer_lines,
            partial: String::new(),
        })
    }

    fn rotated(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files > 0 {
            for n in (1..self.max_files).rev() {
                let from = self.rotated(n);
                if from.exists() {
                    std::fs::rename(&from, self.rotated(n + 1))?;
                }
            }
            std::fs::rename(&self.path, self.rotated(1))?;
        }
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, bytes: &[u8]) {
        if self.buffer_lines == 0 {
            return;
        }
        self.partial.push_str(&String::from_utf8_lossy(bytes));
        while let Some(end) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=end).collect();
            if self.recent.len() == self.buffer_lines {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        self.remember(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Shared handle to the active log file; cheap to clone
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

impl RollingWriter {
    pub fn open(config: &LoggerConfig) -> Result<Self, LoggerError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(RollingFile::open(config)?)),
        })
    }

    /// Up to `n` most recent complete lines, oldest first
    pub fn recent_lines(&self, n: usize) -> Vec<String> {
        let Ok(file) = self.inner.lock() else {
            return Vec::new();
        };
        let skip = file.recent.len().saturating_sub(n);
        file.recent.iter().skip(skip).cloned().collect()
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.inner.lock().ok().map(|file| file.path.clone())
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber. Only the first call succeeds.
pub fn init_with(config: LoggerConfig) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    let writer = RollingWriter::open(&config)?;

    let file_layer = fmt::layer()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_timer(LocalTime);
    let stderr_layer = config.echo_stderr.then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_timer(LocalTime)
    });

    tracing_subscriber::registry()
        .with(config.level)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| LoggerError::Subscriber(e.to_string()))?;

    LOGGER
        .set(writer)
        .map_err(|_| LoggerError::AlreadyInitialized)
}

fn installed() -> Result<&'static RollingWriter, LoggerError> {
    LOGGER.get().ok_or(LoggerError::NotInitialized)
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    installed()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), LoggerError> {
    installed()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    installed()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent log lines; empty before initialization
pub fn recent_lines(n: usize) -> Vec<String> {
    installed()
        .map(|writer| writer.recent_lines(n))
        .unwrap_or_default()
}

/// Active log file, once initialized
pub fn log_file() -> Option<PathBuf> {
    installed().ok().and_then(RollingWriter::path)
}
