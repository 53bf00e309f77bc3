//! Per-invocation context
//!
//! Resolves the configuration directory once and carries the global
//! verbosity to the command implementations.

use std::path::{Path, PathBuf};

use offsync_core::{ConfigDir, Registry, Settings, TransferOptions};

use crate::cli::TransferArgs;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Context {
    config: ConfigDir,
    pub verbosity: u8,
}

impl Context {
    pub fn new(config_dir: Option<PathBuf>, verbosity: u8) -> Result<Self> {
        Ok(Self {
            config: ConfigDir::resolve(config_dir)?,
            verbosity,
        })
    }

    pub fn config(&self) -> &ConfigDir {
        &self.config
    }

    pub fn registry(&self) -> Result<Registry> {
        Ok(self.config.load_registry()?)
    }

    /// Load, modify and save the registry while holding its lock.
    pub fn update<T>(&self, f: impl FnOnce(&mut Registry) -> Result<T>) -> Result<T> {
        self.config.update_registry(f)
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(self.config.load_settings()?)
    }

    pub fn transfer_options(&self, args: &TransferArgs) -> TransferOptions {
        TransferOptions {
            verbosity: self.verbosity,
            dry_run: args.dry_run,
            extra_args: args.rsync.clone(),
        }
    }
}

/// Absolute, symlink-resolved form of a user-supplied path, which may not
/// exist yet.
pub fn resolve(path: &Path) -> Result<PathBuf> {
    Ok(offsync_fs::canonicalize(path)?)
}
