//! Config file watcher.
//!
//! Watches `config.yaml` and reports changes so the host can re-merge group
//! colors. Editors often save a file several times in quick succession, so
//! notifications inside the debounce window are collapsed into one.

use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

/// The watched config file changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChanged {
    pub path: PathBuf,
}

/// Collapses bursts of notifications into a single event.
#[derive(Debug)]
pub(crate) struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub(crate) fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true if an event arriving at `now` should be delivered.
    pub(crate) fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Watches one config file and queues [`ConfigChanged`] events.
pub struct ConfigWatcher {
    // Dropping the watcher stops notifications.
    _watcher: Box<dyn Watcher + Send>,
    events: Receiver<ConfigChanged>,
}

impl std::fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcher").finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct Target {
    file_name: OsString,
    path: PathBuf,
    tx: Sender<ConfigChanged>,
    debouncer: Arc<Mutex<Debouncer>>,
}

impl Target {
    fn handle(&self, result: std::result::Result<Event, notify::Error>) {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Config watcher error: {e}");
                return;
            }
        };

        // Create covers editors that save via rename
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return;
        }
        let touches_config = event
            .paths
            .iter()
            .any(|p| p.file_name().is_some_and(|f| f == self.file_name));
        if !touches_config {
            return;
        }

        if !self.debouncer.lock().admit(Instant::now()) {
            log::trace!("Debouncing config change event");
            return;
        }

        log::info!("Config file changed: {}", self.path.display());
        if let Err(e) = self.tx.send(ConfigChanged {
            path: self.path.clone(),
        }) {
            log::error!("Failed to queue config change event: {e}");
        }
    }
}

impl ConfigWatcher {
    /// Start watching `config_path`.
    ///
    /// Uses the platform's native backend and falls back to polling every
    /// 500 ms when it is unavailable (containers, network filesystems).
    ///
    /// # Errors
    /// Returns an error if the file does not exist or no backend can watch
    /// its directory.
    pub fn new(config_path: &Path, debounce_ms: u64) -> Result<Self> {
        if !config_path.exists() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        }
        let path = config_path
            .canonicalize()
            .unwrap_or_else(|_| config_path.to_path_buf());
        let file_name = path
            .file_name()
            .context("Config path has no filename")?
            .to_os_string();
        let dir = path
            .parent()
            .context("Config path has no parent directory")?
            .to_path_buf();

        let (tx, events) = channel();
        let target = Target {
            file_name,
            path: path.clone(),
            tx,
            debouncer: Arc::new(Mutex::new(Debouncer::new(Duration::from_millis(
                debounce_ms,
            )))),
        };

        let mut watcher = Self::backend(target)?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;
        log::info!("Watching config file {}", path.display());

        Ok(Self {
            _watcher: watcher,
            events,
        })
    }

    fn backend(target: Target) -> Result<Box<dyn Watcher + Send>> {
        let native = target.clone();
        match notify::recommended_watcher(move |res| native.handle(res)) {
            Ok(w) => Ok(Box::new(w)),
            Err(e) => {
                log::warn!("Native file watcher unavailable ({e}); falling back to polling");
                let poll = PollWatcher::new(
                    move |res| target.handle(res),
                    NotifyConfig::default().with_poll_interval(Duration::from_millis(500)),
                )
                .context("Failed to create PollWatcher")?;
                Ok(Box::new(poll))
            }
        }
    }

    /// Next pending change, if any (non-blocking).
    pub fn try_recv(&self) -> Option<ConfigChanged> {
        self.events.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_debouncer_collapses_bursts() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        assert!(debouncer.admit(start));
        assert!(!debouncer.admit(start + Duration::from_millis(40)));
        assert!(!debouncer.admit(start + Duration::from_millis(99)));
        assert!(debouncer.admit(start + Duration::from_millis(150)));
    }

    #[test]
    fn test_watcher_requires_existing_file() {
        let temp_dir = TempDir::new().expect("temp dir");
        let result = ConfigWatcher::new(&temp_dir.path().join("missing.yaml"), 100);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_initial_events() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "opacity: 0.3\n").expect("write");

        let watcher = ConfigWatcher::new(&config_path, 100).expect("watcher");
        assert!(watcher.try_recv().is_none());
        assert!(format!("{watcher:?}").contains("ConfigWatcher"));
    }

    #[test]
    fn test_file_change_detection() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "opacity: 0.3\n").expect("write");

        let watcher = ConfigWatcher::new(&config_path, 50).expect("watcher");
        std::thread::sleep(Duration::from_millis(100));
        fs::write(&config_path, "opacity: 0.4\n").expect("write");
        std::thread::sleep(Duration::from_millis(700));

        // Delivery timing is platform-dependent; only check the payload.
        if let Some(event) = watcher.try_recv() {
            assert!(event.path.ends_with("config.yaml"));
        }
    }
}
