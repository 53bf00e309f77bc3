//! Target Registry
//!
//! The registry owns every configured [`Target`] and its tree. It is
//! persisted as `targets.toml` in the configuration directory; loading
//! takes a shared lock and saving an exclusive one, so concurrent offsync
//! processes never observe a partial file. [`Registry::update`] keeps the
//! exclusive lock across a whole load-modify-save cycle.

use std::path::{Path, PathBuf};

use offsync_fs::{LockedFile, NormalizedPath, RobustnessConfig, io};
use serde::{Deserialize, Serialize};

use crate::target::Target;
use crate::tree::{Mark, PathTree, TreePath};
use crate::{Error, Result};

const FORMAT_VERSION: &str = "1.0";

/// All configured targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registry {
    /// Registry format version for forward compatibility
    version: String,
    /// Targets sorted by root
    #[serde(default)]
    targets: Vec<Target>,
}

/// On-disk layout, read before any tree is rebuilt so that a corrupt tree
/// surfaces as [`Error::TreeCorruption`] rather than a parse error.
#[derive(Deserialize)]
struct StoredRegistry {
    version: String,
    #[serde(default)]
    targets: Vec<StoredTarget>,
}

#[derive(Deserialize)]
struct StoredTarget {
    source: String,
    root: PathBuf,
    #[serde(default)]
    paths: Vec<Mark>,
}

impl TryFrom<StoredTarget> for Target {
    type Error = Error;

    fn try_from(stored: StoredTarget) -> Result<Self> {
        let tree = PathTree::from_marks(stored.paths).map_err(|e| match e {
            Error::TreeCorruption { message } => Error::corruption(format!(
                "target {}: {}",
                stored.root.display(),
                message
            )),
            other => other,
        })?;
        Ok(Target {
            source: stored.source,
            root: stored.root,
            tree,
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            targets: Vec::new(),
        }
    }

    /// Load a registry from a TOML file under a shared lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, locked or parsed, and
    /// [`Error::TreeCorruption`] if a stored tree is inconsistent.
    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_locked(&NormalizedPath::new(path), RobustnessConfig::default())?;
        let registry = Self::from_toml(&content)?;

        tracing::debug!(
            path = %path.display(),
            targets = registry.targets.len(),
            "loaded registry"
        );
        Ok(registry)
    }

    /// Parse the persisted form.
    pub fn from_toml(content: &str) -> Result<Self> {
        let stored: StoredRegistry = toml::from_str(content)?;
        let mut targets = stored
            .targets
            .into_iter()
            .map(Target::try_from)
            .collect::<Result<Vec<_>>>()?;
        targets.sort_by(|a, b| a.root.cmp(&b.root));

        Ok(Self {
            version: stored.version,
            targets,
        })
    }

    /// Load, modify and save the registry under one exclusive lock.
    ///
    /// Nothing is written when `f` fails. A missing file starts out as an
    /// empty registry.
    pub fn update<T, E>(
        path: &Path,
        f: impl FnOnce(&mut Registry) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        let file = LockedFile::acquire(&NormalizedPath::new(path), RobustnessConfig::default())
            .map_err(Error::from)?;
        let mut registry = match file.read().map_err(Error::from)? {
            Some(content) => Self::from_toml(&content)?,
            None => Self::new(),
        };

        let value = f(&mut registry)?;

        registry.warn_source_mismatches();
        let content = toml::to_string_pretty(&registry).map_err(Error::from)?;
        file.write(content.as_bytes()).map_err(Error::from)?;
        tracing::debug!(path = %path.display(), "updated registry");
        Ok(value)
    }

    /// Load the registry, or start an empty one if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no registry yet");
            Ok(Self::new())
        }
    }

    /// Save the registry atomically under an exclusive lock.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.warn_source_mismatches();

        let content = toml::to_string_pretty(self)?;
        io::write_atomic(
            &NormalizedPath::new(path),
            content.as_bytes(),
            RobustnessConfig::default(),
        )?;
        Ok(())
    }

    fn warn_source_mismatches(&self) {
        for target in &self.targets {
            if target.root.is_dir() && !target.has_directory_source() {
                tracing::warn!(
                    root = %target.root.display(),
                    source = %target.source,
                    "directory target uses a non-directory source"
                );
            }
        }
    }

    /// Format version of the loaded file.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Targets sorted by root.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn get(&self, root: &Path) -> Option<&Target> {
        self.targets.iter().find(|t| t.root == root)
    }

    pub fn get_mut(&mut self, root: &Path) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.root == root)
    }

    /// Register a new target.
    ///
    /// Roots may not nest: the new root must neither lie inside nor contain
    /// an existing one.
    pub fn add(&mut self, source: impl Into<String>, root: PathBuf) -> Result<&Target> {
        let candidate = NormalizedPath::new(&root);
        for existing in &self.targets {
            let existing_root = NormalizedPath::new(&existing.root);
            if candidate.is_within(&existing_root) || existing_root.is_within(&candidate) {
                return Err(Error::TargetOverlap {
                    root,
                    existing: existing.root.clone(),
                });
            }
        }

        let target = Target::new(source, root);
        tracing::debug!(root = %target.root.display(), source = %target.source, "adding target");

        let pos = self
            .targets
            .partition_point(|t| t.root < target.root);
        self.targets.insert(pos, target);
        Ok(&self.targets[pos])
    }

    /// Forget a target and all of its decisions.
    pub fn remove(&mut self, root: &Path) -> Result<Target> {
        let pos = self
            .targets
            .iter()
            .position(|t| t.root == root)
            .ok_or_else(|| Error::UnknownTarget {
                path: root.to_path_buf(),
            })?;
        let target = self.targets.remove(pos);
        tracing::debug!(root = %root.display(), "removed target");
        Ok(target)
    }

    /// Point a target at a different source.
    pub fn set_source(&mut self, root: &Path, source: impl Into<String>) -> Result<()> {
        let target = self.get_mut(root).ok_or_else(|| Error::UnknownTarget {
            path: root.to_path_buf(),
        })?;
        target.source = source.into();
        tracing::debug!(root = %root.display(), source = %target.source, "changed source");
        Ok(())
    }

    /// Find the target covering `path` and the path relative to its root.
    ///
    /// The relative part is `None` when `path` is the root itself.
    pub fn locate(&self, path: &Path) -> Result<(&Target, Option<TreePath>)> {
        let idx = self.position_covering(path)?;
        let relative = relative_part(&self.targets[idx].root, path)?;
        Ok((&self.targets[idx], relative))
    }

    /// Mutable variant of [`locate`](Self::locate) for a path strictly
    /// inside a target.
    pub fn locate_mut(&mut self, path: &Path) -> Result<(&mut Target, TreePath)> {
        let idx = self.position_covering(path)?;
        let relative = relative_part(&self.targets[idx].root, path)?.ok_or_else(|| {
            Error::InvalidPath {
                path: path.display().to_string(),
                reason: "path is the target root itself".to_string(),
            }
        })?;
        Ok((&mut self.targets[idx], relative))
    }

    /// Include `path` in the target that covers it.
    pub fn include(&mut self, path: &Path) -> Result<TreePath> {
        let (target, relative) = self.locate_mut(path)?;
        target.include(&relative)?;
        Ok(relative)
    }

    /// Evict `path` from the target that covers it.
    pub fn evict(&mut self, path: &Path) -> Result<TreePath> {
        let (target, relative) = self.locate_mut(path)?;
        target.evict(&relative)?;
        Ok(relative)
    }

    /// Reset the mark on `path` in the target that covers it.
    pub fn revert(&mut self, path: &Path) -> Result<TreePath> {
        let (target, relative) = self.locate_mut(path)?;
        target.revert(&relative)?;
        Ok(relative)
    }

    fn position_covering(&self, path: &Path) -> Result<usize> {
        let wanted = NormalizedPath::new(path);
        self.targets
            .iter()
            .position(|t| wanted.is_within(&NormalizedPath::new(&t.root)))
            .ok_or_else(|| Error::UnknownTarget {
                path: path.to_path_buf(),
            })
    }
}

fn relative_part(root: &Path, path: &Path) -> Result<Option<TreePath>> {
    let relative = NormalizedPath::new(path)
        .relative_to(&NormalizedPath::new(root))
        .unwrap_or_default();
    if relative.is_empty() {
        Ok(None)
    } else {
        TreePath::parse(&relative).map(Some)
    }
}
