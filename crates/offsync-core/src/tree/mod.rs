//! Path Tree Model
//!
//! A per-target tree of path-segment nodes carrying include/evict
//! decisions. Anything not decided explicitly is excluded, mirroring the
//! target's ambient default.
//!
//! Nodes are created lazily: marking a path creates `Default` placeholders
//! for missing ancestors, and resetting a mark prunes every node left
//! without a decision. Whether a node is traversed is never stored; it is
//! derived from its subtree (see [`crate::rules`]).

mod node;
mod path;

pub use node::{Node, NodeState};
pub use path::TreePath;
pub(crate) use path::name_problem;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Effective ruling for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ruling {
    /// Synchronized because of the mark on the given path
    Included(TreePath),
    /// Excluded because of the mark on the given path
    Evicted(TreePath),
    /// No mark applies; the target's ambient exclusion holds
    Ambient,
}

/// One explicit decision in flattened form, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub location: String,
    pub state: NodeState,
}

/// Tree of include/evict decisions rooted at a target's local root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Mark>", into = "Vec<Mark>")]
pub struct PathTree {
    root: Node,
}

impl PathTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The unnamed node standing for the target root.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Whether the tree holds no decisions at all.
    pub fn is_empty(&self) -> bool {
        self.root.children().is_empty()
    }

    /// Node at `path`, if it exists.
    pub fn get(&self, path: &TreePath) -> Option<&Node> {
        self.root.descend(path)
    }

    /// Effective ruling for `path`.
    ///
    /// The outermost Included mark on the way down wins, since nothing
    /// beneath an included node matters. Otherwise the nearest Evicted mark
    /// decides.
    pub fn ruling(&self, path: &TreePath) -> Ruling {
        let mut node = &self.root;
        let mut evicted_by = None;

        for (depth, segment) in path.segments().iter().enumerate() {
            node = match node.child(segment) {
                Some(child) => child,
                None => break,
            };
            match node.state() {
                NodeState::Included => return Ruling::Included(path.prefix(depth + 1)),
                NodeState::Evicted => evicted_by = Some(path.prefix(depth + 1)),
                NodeState::Default => {}
            }
        }

        evicted_by.map(Ruling::Evicted).unwrap_or(Ruling::Ambient)
    }

    /// Mark `path` Included.
    ///
    /// Marks beneath it are discarded: an included subtree is synchronized
    /// as a whole.
    pub fn include(&mut self, path: &TreePath) -> Result<()> {
        if let Ruling::Included(by) = self.ruling(path) {
            return Err(Error::AlreadyIncluded {
                path: path.to_string(),
                by: by.to_string(),
            });
        }

        let node = self.root.ensure(path);
        let discarded = node.clear_children();
        node.set_state(NodeState::Included);

        tracing::debug!(%path, discarded, "included path");
        Ok(())
    }

    /// Mark `path` Evicted.
    ///
    /// Rejected while included paths remain beneath it, or when it lies
    /// inside an included directory.
    pub fn evict(&mut self, path: &TreePath) -> Result<()> {
        if let Some(node) = self.root.descend(path) {
            let included = node.included_descendants(path);
            if let Some(example) = included.first() {
                return Err(Error::HasIncludedDescendants {
                    path: path.to_string(),
                    count: included.len(),
                    example: example.to_string(),
                });
            }
        }

        match self.ruling(path) {
            Ruling::Included(by) if by != *path => {
                return Err(Error::IncludedAncestor {
                    path: path.to_string(),
                    ancestor: by.to_string(),
                });
            }
            Ruling::Evicted(by) => {
                return Err(Error::AlreadyEvicted {
                    path: path.to_string(),
                    by: by.to_string(),
                });
            }
            Ruling::Included(_) | Ruling::Ambient => {}
        }

        // Only redundant evictions can remain beneath
        let node = self.root.ensure(path);
        let discarded = node.clear_children();
        node.set_state(NodeState::Evicted);

        tracing::debug!(%path, discarded, "evicted path");
        Ok(())
    }

    /// Reset the mark on `path` and prune nodes left without purpose.
    pub fn revert(&mut self, path: &TreePath) -> Result<()> {
        let node = self
            .root
            .descend_mut(path)
            .filter(|node| node.state() != NodeState::Default)
            .ok_or_else(|| Error::NotMarked {
                path: path.to_string(),
            })?;
        node.set_state(NodeState::Default);

        let pruned = self.prune_upwards(path);
        tracing::debug!(%path, pruned, "reverted path");
        Ok(())
    }

    /// Remove the node at `path` and then each ancestor, for as long as
    /// the node under consideration is childless and `Default`.
    fn prune_upwards(&mut self, path: &TreePath) -> usize {
        let mut pruned = 0;
        let mut current = Some(path.clone());

        while let Some(path) = current {
            let parent_path = path.parent();
            let parent = match &parent_path {
                Some(parent_path) => self.root.descend_mut(parent_path),
                None => Some(&mut self.root),
            };
            let Some(parent) = parent else { break };

            let prunable = parent
                .child(path.name())
                .is_some_and(Node::is_prunable);
            if !prunable {
                break;
            }
            parent.remove_child(path.name());
            pruned += 1;
            current = parent_path;
        }

        pruned
    }

    /// Every explicit decision in pre-order, siblings in declaration order.
    pub fn marks(&self) -> Vec<Mark> {
        let mut marks = Vec::new();
        for child in self.root.children() {
            collect_marks(child, child.name().to_string(), &mut marks);
        }
        marks
    }

    /// Rebuild a tree from [`marks`](Self::marks) output.
    ///
    /// Marks beneath an Included mark cannot come out of [`include`](Self::include)
    /// and are reported as corruption.
    pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Result<Self> {
        let mut tree = Self::new();
        for mark in marks {
            let path = TreePath::parse(&mark.location).map_err(|e| {
                Error::corruption(format!("stored location '{}': {}", mark.location, e))
            })?;
            if mark.state == NodeState::Default {
                return Err(Error::corruption(format!(
                    "stored location '{}' has no state",
                    mark.location
                )));
            }

            if let Ruling::Included(by) = tree.ruling(&path) {
                if by != path {
                    return Err(Error::corruption(format!(
                        "location '{}' lies inside included '{}'",
                        mark.location, by
                    )));
                }
            }

            let node = tree.root.ensure(&path);
            if node.state() != NodeState::Default {
                return Err(Error::corruption(format!(
                    "location '{}' is stored twice",
                    mark.location
                )));
            }
            if mark.state == NodeState::Included && !node.children().is_empty() {
                return Err(Error::corruption(format!(
                    "included location '{}' has marks beneath it",
                    mark.location
                )));
            }
            node.set_state(mark.state);
        }
        Ok(tree)
    }

    /// Check node names and sibling uniqueness.
    pub fn validate(&self) -> Result<()> {
        validate_children(&self.root, "")
    }
}

fn collect_marks(node: &Node, location: String, marks: &mut Vec<Mark>) {
    if node.state() != NodeState::Default {
        marks.push(Mark {
            location: location.clone(),
            state: node.state(),
        });
    }
    for child in node.children() {
        collect_marks(child, format!("{}/{}", location, child.name()), marks);
    }
}

/// Validate the direct children of `node`, then recurse.
pub(crate) fn validate_children(node: &Node, path: &str) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for child in node.children() {
        if let Some(reason) = name_problem(child.name()) {
            return Err(Error::corruption(format!(
                "child {:?} of '{}': {}",
                child.name(),
                path,
                reason
            )));
        }
        if !seen.insert(child.name()) {
            return Err(Error::corruption(format!(
                "duplicate child '{}' under '{}'",
                child.name(),
                path
            )));
        }
        let child_path = if path.is_empty() {
            child.name().to_string()
        } else {
            format!("{}/{}", path, child.name())
        };
        validate_children(child, &child_path)?;
    }
    Ok(())
}

impl TryFrom<Vec<Mark>> for PathTree {
    type Error = Error;

    fn try_from(marks: Vec<Mark>) -> Result<Self> {
        Self::from_marks(marks)
    }
}

impl From<PathTree> for Vec<Mark> {
    fn from(tree: PathTree) -> Self {
        tree.marks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(raw: &str) -> TreePath {
        TreePath::parse(raw).unwrap()
    }

    #[test]
    fn include_creates_pass_through_ancestors() {
        let mut tree = PathTree::new();
        tree.include(&path("A/B/C/D")).unwrap();

        assert_eq!(tree.get(&path("A")).unwrap().state(), NodeState::Default);
        assert_eq!(tree.get(&path("A/B/C")).unwrap().state(), NodeState::Default);
        assert_eq!(
            tree.get(&path("A/B/C/D")).unwrap().state(),
            NodeState::Included
        );
    }

    #[test]
    fn include_below_included_is_redundant() {
        let mut tree = PathTree::new();
        tree.include(&path("A")).unwrap();

        let err = tree.include(&path("A/B")).unwrap_err();
        assert!(matches!(err, Error::AlreadyIncluded { ref by, .. } if by == "A"));
        assert!(err.is_redundant());
        assert!(tree.get(&path("A/B")).is_none());
    }

    #[test]
    fn include_discards_marks_beneath() {
        let mut tree = PathTree::new();
        tree.include(&path("A/B")).unwrap();
        tree.evict(&path("A/C")).unwrap();

        tree.include(&path("A")).unwrap();

        let a = tree.get(&path("A")).unwrap();
        assert_eq!(a.state(), NodeState::Included);
        assert!(a.children().is_empty());
    }

    #[test]
    fn evict_rejects_node_with_included_descendants() {
        let mut tree = PathTree::new();
        tree.include(&path("A/B/C")).unwrap();
        tree.include(&path("A/D")).unwrap();

        let err = tree.evict(&path("A")).unwrap_err();
        match err {
            Error::HasIncludedDescendants { count, example, .. } => {
                assert_eq!(count, 2);
                assert_eq!(example, "A/B/C");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(tree.get(&path("A")).unwrap().state(), NodeState::Default);
    }

    #[test]
    fn evict_inside_included_is_rejected() {
        let mut tree = PathTree::new();
        tree.include(&path("A")).unwrap();

        let err = tree.evict(&path("A/B")).unwrap_err();
        assert!(matches!(err, Error::IncludedAncestor { ref ancestor, .. } if ancestor == "A"));
    }

    #[test]
    fn evict_switches_included_node() {
        let mut tree = PathTree::new();
        tree.include(&path("A")).unwrap();
        tree.evict(&path("A")).unwrap();
        assert_eq!(tree.get(&path("A")).unwrap().state(), NodeState::Evicted);
    }

    #[test]
    fn evict_twice_is_redundant() {
        let mut tree = PathTree::new();
        tree.evict(&path("A")).unwrap();

        assert!(matches!(
            tree.evict(&path("A")),
            Err(Error::AlreadyEvicted { .. })
        ));
        assert!(matches!(
            tree.evict(&path("A/B")),
            Err(Error::AlreadyEvicted { ref by, .. }) if by == "A"
        ));
    }

    #[test]
    fn include_under_evicted_keeps_nominal_state() {
        let mut tree = PathTree::new();
        tree.evict(&path("A")).unwrap();
        tree.include(&path("A/B")).unwrap();

        assert_eq!(tree.get(&path("A")).unwrap().state(), NodeState::Evicted);
        assert_eq!(tree.ruling(&path("A/B/x")), Ruling::Included(path("A/B")));
        assert_eq!(tree.ruling(&path("A/C")), Ruling::Evicted(path("A")));
    }

    #[test]
    fn revert_prunes_empty_ancestors() {
        let mut tree = PathTree::new();
        tree.include(&path("A/B/C/D")).unwrap();

        tree.revert(&path("A/B/C/D")).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn revert_stops_at_marked_or_branching_ancestor() {
        let mut tree = PathTree::new();
        tree.evict(&path("A")).unwrap();
        tree.include(&path("A/B/C")).unwrap();
        tree.include(&path("A/D")).unwrap();

        tree.revert(&path("A/B/C")).unwrap();
        assert!(tree.get(&path("A/B")).is_none());
        assert!(tree.get(&path("A/D")).is_some());

        tree.revert(&path("A/D")).unwrap();
        assert_eq!(tree.get(&path("A")).unwrap().state(), NodeState::Evicted);
        assert!(tree.get(&path("A")).unwrap().children().is_empty());
    }

    #[test]
    fn revert_keeps_node_that_still_leads_somewhere() {
        let mut tree = PathTree::new();
        tree.evict(&path("A")).unwrap();
        tree.include(&path("A/B")).unwrap();

        tree.revert(&path("A")).unwrap();
        assert_eq!(tree.get(&path("A")).unwrap().state(), NodeState::Default);
        assert_eq!(tree.ruling(&path("A/C")), Ruling::Ambient);
    }

    #[test]
    fn revert_unmarked_path() {
        let mut tree = PathTree::new();
        tree.include(&path("A/B")).unwrap();

        assert!(matches!(tree.revert(&path("A")), Err(Error::NotMarked { .. })));
        assert!(matches!(tree.revert(&path("X")), Err(Error::NotMarked { .. })));
    }

    #[test]
    fn marks_round_trip_preserves_declaration_order() {
        let mut tree = PathTree::new();
        tree.include(&path("zeta/one")).unwrap();
        tree.evict(&path("alpha")).unwrap();
        tree.include(&path("alpha/two")).unwrap();
        tree.include(&path("zeta/aaa")).unwrap();

        let marks = tree.marks();
        let locations: Vec<_> = marks.iter().map(|m| m.location.as_str()).collect();
        assert_eq!(locations, ["zeta/one", "zeta/aaa", "alpha", "alpha/two"]);

        let rebuilt = PathTree::from_marks(marks).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn from_marks_rejects_duplicates() {
        let marks = vec![
            Mark {
                location: "A".into(),
                state: NodeState::Included,
            },
            Mark {
                location: "A/".into(),
                state: NodeState::Evicted,
            },
        ];
        let err = PathTree::from_marks(marks).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn from_marks_rejects_bad_location() {
        let marks = vec![Mark {
            location: "/etc".into(),
            state: NodeState::Evicted,
        }];
        assert!(matches!(
            PathTree::from_marks(marks),
            Err(Error::TreeCorruption { .. })
        ));
    }

    #[rstest::rstest]
    #[case(&[("A", NodeState::Included), ("A/B", NodeState::Evicted)])]
    #[case(&[("A/B", NodeState::Evicted), ("A", NodeState::Included)])]
    #[case(&[("A/B", NodeState::Included), ("A", NodeState::Included)])]
    fn from_marks_rejects_marks_beneath_included(#[case] stored: &[(&str, NodeState)]) {
        let marks = stored.iter().map(|(location, state)| Mark {
            location: location.to_string(),
            state: *state,
        });
        let err = PathTree::from_marks(marks).unwrap_err();
        assert!(err.is_fatal(), "{err:?}");
    }

    #[test]
    fn from_marks_accepts_include_under_evicted() {
        let marks = vec![
            Mark {
                location: "A".into(),
                state: NodeState::Evicted,
            },
            Mark {
                location: "A/B".into(),
                state: NodeState::Included,
            },
        ];
        let tree = PathTree::from_marks(marks).unwrap();
        assert_eq!(tree.ruling(&path("A/B/c")), Ruling::Included(path("A/B")));
    }

    #[test]
    fn validate_accepts_built_trees() {
        let mut tree = PathTree::new();
        tree.include(&path("A/B")).unwrap();
        tree.evict(&path("C")).unwrap();
        tree.validate().unwrap();
    }
}
