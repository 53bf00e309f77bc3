//! Filesystem layer for offsync
//!
//! Provides normalized path handling, locked atomic writes and
//! format-agnostic configuration files.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::ConfigFile;
pub use error::{Error, Result};
pub use io::{LockedFile, RobustnessConfig};
pub use path::{NormalizedPath, canonicalize};
