//! Logging bridge for the `linemark` binary.
//!
//! Routes every `log::info!()` etc. to a debug log file
//! (`/tmp/linemark_debug.log` on Unix, `%TEMP%\linemark_debug.log` on Windows)
//! so command output on stdout stays clean. The file is created on the first
//! record that passes the level filter, so quiet runs leave none behind. When
//! `RUST_LOG` is set, records are mirrored to stderr as well.
//!
//! Level precedence: `--log-level`, then `RUST_LOG`, then the configured
//! `log_level` (applied once the config has been loaded), then `warn`.

use linemark_config::LogLevel;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where the active level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelSource {
    Cli,
    Env,
    Default,
}

/// State of the log file, opened on the first record that passes the filter.
enum LogFile {
    Pending,
    Open(File),
    /// Opening failed; run without a file.
    Unavailable,
}

struct DebugLogger {
    path: PathBuf,
    file: Mutex<LogFile>,
    mirror_stderr: bool,
    source: LevelSource,
}

impl DebugLogger {
    fn new(path: PathBuf, source: LevelSource, mirror_stderr: bool) -> Self {
        Self {
            path,
            file: Mutex::new(LogFile::Pending),
            mirror_stderr,
            source,
        }
    }

    fn open(&self) -> LogFile {
        match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                let header = format!(
                    "{}\nlinemark debug session started at {} (level={})\n{}\n",
                    "=".repeat(80),
                    timestamp(),
                    log::max_level(),
                    "=".repeat(80)
                );
                let _ = file.write_all(header.as_bytes());
                LogFile::Open(file)
            }
            Err(_) => LogFile::Unavailable,
        }
    }

    fn write_raw(&self, msg: &str) {
        let mut file = self.file.lock();
        if matches!(*file, LogFile::Pending) {
            *file = self.open();
        }
        if let LogFile::Open(file) = &mut *file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl Log for DebugLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_raw(&line);
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let LogFile::Open(file) = &mut *self.file.lock() {
            let _ = file.flush();
        }
    }
}

static LOGGER: OnceLock<DebugLogger> = OnceLock::new();

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    {
        PathBuf::from("/tmp/linemark_debug.log")
    }
    #[cfg(not(unix))]
    {
        std::env::temp_dir().join("linemark_debug.log")
    }
}

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Level named by `RUST_LOG`, if it is a plain level name.
fn env_level() -> Option<LevelFilter> {
    let value = std::env::var("RUST_LOG").ok()?;
    LogLevel::from_name(value.trim()).map(LogLevel::to_level_filter)
}

/// Install the logger. Safe to call more than once; later calls are ignored.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let mirror_stderr = std::env::var_os("RUST_LOG").is_some();
    let (source, level) = match (cli_level, env_level()) {
        (Some(level), _) => (LevelSource::Cli, level.to_level_filter()),
        (None, Some(level)) => (LevelSource::Env, level),
        (None, None) => (LevelSource::Default, LogLevel::default().to_level_filter()),
    };

    let mut installed = false;
    let logger = LOGGER.get_or_init(|| {
        installed = true;
        DebugLogger::new(log_path(), source, mirror_stderr)
    });
    if installed && log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

/// Apply the configured level unless `--log-level` or `RUST_LOG` already
/// chose one.
pub fn apply_config_level(level: LogLevel) {
    if let Some(logger) = LOGGER.get()
        && logger.source == LevelSource::Default
    {
        log::set_max_level(level.to_level_filter());
    }
}
