//! Well-known file names inside the offsync configuration directory.

use std::path::Path;

/// Name of the per-user configuration directory.
pub const APP_DIR: &str = "offsync";

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "OFFSYNC_CONFIG_DIR";

/// Files stored in the configuration directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFile {
    /// `config.toml`, user settings
    Settings,
    /// `targets.toml`, the persisted target registry
    Targets,
}

impl ConfigFile {
    /// Get the file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Settings => "config.toml",
            Self::Targets => "targets.toml",
        }
    }

    /// Alternative names accepted when loading, in lookup order.
    pub fn alternatives(&self) -> &'static [&'static str] {
        match self {
            Self::Settings => &["config.toml", "config.yaml", "config.yml", "config.json"],
            Self::Targets => &["targets.toml"],
        }
    }
}

impl AsRef<Path> for ConfigFile {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ConfigFile {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_lookup_prefers_toml() {
        assert_eq!(ConfigFile::Settings.alternatives()[0], ConfigFile::Settings.as_str());
    }

    #[test]
    fn display_matches_file_name() {
        assert_eq!(ConfigFile::Targets.to_string(), "targets.toml");
    }
}
