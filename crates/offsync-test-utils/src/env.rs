//! [`TestEnv`] builder for offsync test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary sandbox holding three directories:
///
/// - `config/`: passed as the offsync configuration directory
/// - `remote/`: stands in for the remote source
/// - `local/`: the local target root
///
/// # Example
///
/// ```rust,no_run
/// use offsync_test_utils::TestEnv;
///
/// let env = TestEnv::new();
/// env.remote_file("music/live/set.flac", "audio");
/// env.use_program("true");
/// env.assert_exists("config/config.toml");
/// ```
pub struct TestEnv {
    temp_dir: TempDir,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    /// Create the sandbox with empty `config/`, `remote/` and `local/`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["config", "remote", "local"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root().join("config")
    }

    pub fn remote(&self) -> PathBuf {
        self.root().join("remote")
    }

    pub fn local(&self) -> PathBuf {
        self.root().join("local")
    }

    /// Source string for the remote tree, in directory (trailing slash) form.
    pub fn remote_source(&self) -> String {
        format!("{}/", self.remote().display())
    }

    /// Create a file below `remote/`, with parent directories.
    pub fn remote_file(&self, path: &str, content: &str) -> PathBuf {
        write_file(&self.remote().join(path), content)
    }

    /// Create a file below `local/`, with parent directories.
    pub fn local_file(&self, path: &str, content: &str) -> PathBuf {
        write_file(&self.local().join(path), content)
    }

    /// Write `config/config.toml` selecting `program` as transfer program.
    pub fn use_program(&self, program: &str) {
        let settings = format!("[transfer]\nprogram = \"{}\"\n", program);
        fs::write(self.config_dir().join("config.toml"), settings).unwrap();
    }

    /// Contents of `config/targets.toml`, or an empty string if absent.
    pub fn targets_toml(&self) -> String {
        fs::read_to_string(self.config_dir().join("targets.toml")).unwrap_or_default()
    }

    /// Assert that `path` (relative to the sandbox root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the sandbox root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
