//! Atomic I/O operations with file locking
//!
//! Writers and readers coordinate through an advisory lock on a sibling
//! `<file>.lock`, so the data file itself can be replaced by rename while
//! the lock is held.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Tuning knobs for locked I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// Upper bound on time spent waiting for a contended lock
    pub lock_timeout: Duration,
    /// Flush file contents to disk before the rename
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(10),
            enable_fsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LockKind {
    Shared,
    Exclusive,
}

fn lock_path(native_path: &Path) -> PathBuf {
    let mut name = native_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    native_path.with_file_name(name)
}

/// Open the sibling lock file and acquire it, retrying with exponential
/// backoff until `config.lock_timeout` elapses.
fn acquire_lock(native_path: &Path, kind: LockKind, config: RobustnessConfig) -> Result<File> {
    let lock_path = lock_path(native_path);
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;

    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(10))
        .with_max_interval(Duration::from_millis(250))
        .with_max_elapsed_time(Some(config.lock_timeout))
        .build();

    backoff::retry(policy, || {
        let attempt = match kind {
            LockKind::Shared => FileExt::try_lock_shared(&lock_file),
            LockKind::Exclusive => FileExt::try_lock_exclusive(&lock_file),
        };
        attempt.map_err(backoff::Error::transient)
    })
    .map_err(|_| {
        tracing::warn!(path = %native_path.display(), ?kind, "lock acquisition timed out");
        Error::LockFailed {
            path: native_path.to_path_buf(),
        }
    })?;

    Ok(lock_file)
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial file.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();
    create_parent(&native_path)?;

    let _lock = acquire_lock(&native_path, LockKind::Exclusive, config)?;
    replace_file(&native_path, content, config)?;

    tracing::debug!(path = %path, bytes = content.len(), "wrote file atomically");
    Ok(())
}

/// Read a file while holding a shared lock.
pub fn read_locked(path: &NormalizedPath, config: RobustnessConfig) -> Result<String> {
    let native_path = path.to_native();
    if !native_path.exists() {
        return Err(Error::io(
            &native_path,
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
    }

    let _lock = acquire_lock(&native_path, LockKind::Shared, config)?;
    read_file(&native_path)
}

/// A file held under its exclusive lock for a whole read-modify-write
/// cycle.
///
/// The lock is released on drop. While a `LockedFile` is alive, the same
/// process must not call [`read_locked`] or [`write_atomic`] on the path.
#[derive(Debug)]
pub struct LockedFile {
    path: PathBuf,
    config: RobustnessConfig,
    _lock: File,
}

impl LockedFile {
    /// Take the exclusive lock, creating parent directories as needed.
    pub fn acquire(path: &NormalizedPath, config: RobustnessConfig) -> Result<Self> {
        let native_path = path.to_native();
        create_parent(&native_path)?;
        let lock = acquire_lock(&native_path, LockKind::Exclusive, config)?;
        tracing::trace!(path = %path, "holding exclusive lock");
        Ok(Self {
            path: native_path,
            config,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current content, or `None` if the file does not exist yet.
    pub fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        read_file(&self.path).map(Some)
    }

    /// Replace the content atomically without releasing the lock.
    pub fn write(&self, content: &[u8]) -> Result<()> {
        replace_file(&self.path, content, self.config)?;
        tracing::debug!(path = %self.path.display(), bytes = content.len(), "wrote locked file");
        Ok(())
    }
}

fn create_parent(native_path: &Path) -> Result<()> {
    if let Some(parent) = native_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(())
}

fn read_file(native_path: &Path) -> Result<String> {
    let mut content = String::new();
    File::open(native_path)
        .and_then(|mut file| file.read_to_string(&mut content))
        .map_err(|e| Error::io(native_path, e))?;
    Ok(content)
}

/// Temp file plus rename; the caller holds the exclusive lock.
fn replace_file(native_path: &Path, content: &[u8], config: RobustnessConfig) -> Result<()> {
    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    if config.enable_fsync {
        temp_file
            .sync_all()
            .map_err(|e| Error::io(&temp_path, e))?;
    }
    drop(temp_file);

    if let Err(e) = fs::rename(&temp_path, native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(native_path, e));
    }
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}
