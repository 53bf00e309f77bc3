//! User settings and the configuration directory

use std::path::{Path, PathBuf};

use offsync_fs::constants::{APP_DIR, CONFIG_DIR_ENV};
use offsync_fs::{ConfigFile, ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::registry::Registry;
use crate::{Error, Result};

/// Contents of `config.toml` (or its YAML/JSON alternatives).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub transfer: TransferSettings,
}

/// The `[transfer]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// rsync-compatible program to run
    pub program: String,
    /// Options every invocation starts with
    pub base_options: Vec<String>,
    /// Extra options appended after the base options
    pub options: Vec<String>,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            program: "rsync".to_string(),
            base_options: vec!["-raHEAXS".to_string(), "--protect-args".to_string()],
            options: Vec::new(),
        }
    }
}

/// The directory holding `config.toml` and `targets.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    path: PathBuf,
}

impl ConfigDir {
    /// Resolve the configuration directory.
    ///
    /// Lookup order: `explicit`, `$OFFSYNC_CONFIG_DIR`, then the platform
    /// config directory joined with `offsync`.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let path = explicit
            .or_else(|| std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| dirs::config_dir().map(|d| d.join(APP_DIR)))
            .ok_or(Error::ConfigDirUnavailable)?;

        tracing::debug!(path = %path.display(), "using configuration directory");
        Ok(Self { path })
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn targets_file(&self) -> PathBuf {
        self.path.join(ConfigFile::Targets)
    }

    /// The first settings file that exists, in lookup order.
    pub fn settings_file(&self) -> Option<PathBuf> {
        ConfigFile::Settings
            .alternatives()
            .iter()
            .map(|name| self.path.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Load settings; a missing file yields the defaults.
    pub fn load_settings(&self) -> Result<Settings> {
        match self.settings_file() {
            Some(file) => {
                let settings = ConfigStore::new().load(&NormalizedPath::new(&file))?;
                tracing::debug!(path = %file.display(), "loaded settings");
                Ok(settings)
            }
            None => Ok(Settings::default()),
        }
    }

    pub fn load_registry(&self) -> Result<Registry> {
        Registry::load_or_default(&self.targets_file())
    }

    pub fn save_registry(&self, registry: &Registry) -> Result<()> {
        registry.save(&self.targets_file())
    }

    /// Modify the stored registry under its exclusive lock.
    pub fn update_registry<T, E>(
        &self,
        f: impl FnOnce(&mut Registry) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        Registry::update(&self.targets_file(), f)
    }
}
