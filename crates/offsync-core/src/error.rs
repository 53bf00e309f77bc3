//! Error types for offsync-core

use std::path::PathBuf;

/// Result type for offsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in offsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Empty, malformed or improperly rooted path argument
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The path, or one of its ancestors, is already included
    #[error("'{path}' is already included (by '{by}')")]
    AlreadyIncluded { path: String, by: String },

    /// The path is already excluded by its own or an ancestor's mark
    #[error("'{path}' is already excluded (by '{by}')")]
    AlreadyEvicted { path: String, by: String },

    /// Exclusion would hide included paths beneath the node
    #[error(
        "Cannot exclude '{path}': {count} included path(s) beneath it, such as '{example}'. Reset them first"
    )]
    HasIncludedDescendants {
        path: String,
        count: usize,
        example: String,
    },

    /// Exclusions cannot be nested inside an included directory
    #[error("Cannot exclude '{path}' inside included '{ancestor}'. Reset '{ancestor}' first")]
    IncludedAncestor { path: String, ancestor: String },

    /// Reset requested for a path that carries no mark
    #[error("'{path}' is neither included nor excluded explicitly")]
    NotMarked { path: String },

    /// No registered target matches
    #[error("Not inside any target: {path}")]
    UnknownTarget { path: PathBuf },

    /// A new target would nest with an existing one
    #[error("{root} overlaps with existing target {existing}")]
    TargetOverlap { root: PathBuf, existing: PathBuf },

    /// An internal tree invariant is violated
    #[error("Tree corruption: {message}")]
    TreeCorruption { message: String },

    /// No platform configuration directory could be determined
    #[error("Cannot determine configuration directory; set OFFSYNC_CONFIG_DIR")]
    ConfigDirUnavailable,

    /// The external transfer program exited unsuccessfully
    #[error("{program} exited with {}", describe_exit(.code))]
    TransferFailed { program: String, code: Option<i32> },

    /// Filesystem error from offsync-fs
    #[error(transparent)]
    Fs(#[from] offsync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

impl Error {
    pub(crate) fn corruption(message: impl Into<String>) -> Self {
        Self::TreeCorruption {
            message: message.into(),
        }
    }

    /// Redundant requests that leave state untouched.
    pub fn is_redundant(&self) -> bool {
        matches!(
            self,
            Self::AlreadyIncluded { .. } | Self::AlreadyEvicted { .. }
        )
    }

    /// Defects that must stop the process instead of being reported as
    /// ordinary user errors.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TreeCorruption { .. })
    }
}
