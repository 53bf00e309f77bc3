//! Synchronization targets

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rules::Directive;
use crate::tree::{PathTree, TreePath};
use crate::Result;

/// One configured pairing of a remote source and a local root.
///
/// The local root identifies the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Remote location in rsync syntax, e.g. `user@host:/srv/media/`
    pub source: String,
    /// Canonical local directory (or file) mirrored from the source
    pub root: PathBuf,
    /// Include/evict decisions below the root
    #[serde(default, rename = "paths")]
    pub tree: PathTree,
}

impl Target {
    /// Create a target with an empty tree: nothing is synchronized yet.
    pub fn new(source: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            root: root.into(),
            tree: PathTree::new(),
        }
    }

    pub fn id(&self) -> &Path {
        &self.root
    }

    /// Directives for status output.
    pub fn directives(&self) -> Result<Vec<Directive>> {
        self.tree.directives()
    }

    /// Directives for the transfer tool, closed by the ambient exclusion.
    pub fn filter_rules(&self) -> Result<Vec<Directive>> {
        let mut rules = self.tree.directives()?;
        rules.push(Directive::ambient_exclude());
        Ok(rules)
    }

    pub fn include(&mut self, path: &TreePath) -> Result<()> {
        self.tree.include(path)?;
        tracing::debug!(target_root = %self.root.display(), %path, "target path included");
        Ok(())
    }

    pub fn evict(&mut self, path: &TreePath) -> Result<()> {
        self.tree.evict(path)?;
        tracing::debug!(target_root = %self.root.display(), %path, "target path evicted");
        Ok(())
    }

    pub fn revert(&mut self, path: &TreePath) -> Result<()> {
        self.tree.revert(path)?;
        tracing::debug!(target_root = %self.root.display(), %path, "target path reset");
        Ok(())
    }

    /// `true` when the source names a directory (rsync trailing-slash form).
    pub fn has_directory_source(&self) -> bool {
        self.source.ends_with('/')
    }
}
