//! Directive synthesis
//!
//! Post-order structural recursion. Each node's role is derived from its
//! subtree while walking it:
//!
//! - explicitly Included: `+ P/`, children ignored
//! - any child subtree containing an Included node (pass-through): the
//!   children's directives, then `- P/*`, then `+ P/` unless the node is
//!   the synthesis root
//! - explicitly Evicted otherwise: `- P`
//! - `Default` otherwise: nothing
//!
//! A nominally Evicted node with included descendants is therefore
//! pass-through.

use std::collections::HashSet;

use super::{Directive, Pattern};
use crate::tree::{Node, NodeState, PathTree, TreePath, name_problem};
use crate::{Error, Result};

/// Synthesize the directives for the subtree rooted at `node`, which lives
/// at relative path `path`.
///
/// `node` is the synthesis root: its own directory entry is never emitted
/// as an include, since the caller already reaches it.
pub fn synthesize(node: &Node, path: &str) -> Result<Vec<Directive>> {
    let mut out = Vec::new();
    emit(node, path, true, &mut out)?;
    Ok(out)
}

/// Append the directives for `node` and report whether its subtree holds
/// anything included.
fn emit(node: &Node, path: &str, is_root: bool, out: &mut Vec<Directive>) -> Result<bool> {
    if node.state() == NodeState::Included {
        out.push(Directive::include(Pattern::Directory(path.to_string())));
        return Ok(true);
    }

    check_siblings(node, path)?;

    let start = out.len();
    let mut traversed = false;
    for child in node.children() {
        let child_path = join(path, child.name());
        traversed |= emit(child, &child_path, false, out)?;
    }

    if traversed {
        out.push(Directive::exclude(Pattern::Contents(path.to_string())));
        if !is_root {
            out.push(Directive::include(Pattern::Directory(path.to_string())));
        }
        return Ok(true);
    }

    // Nothing below is reached, so eviction marks below are moot
    out.truncate(start);
    if node.state() == NodeState::Evicted {
        out.push(Directive::exclude(Pattern::Exact(path.to_string())));
    }
    Ok(false)
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", path, name)
    }
}

fn check_siblings(node: &Node, path: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(node.children().len());
    for child in node.children() {
        let name = child.name();
        if let Some(reason) = name_problem(name) {
            return Err(Error::corruption(format!(
                "node {:?} under '{}': {}",
                name, path, reason
            )));
        }
        if !seen.insert(name) {
            return Err(Error::corruption(format!(
                "duplicate node '{}' under '{}'",
                name, path
            )));
        }
    }
    Ok(())
}

impl PathTree {
    /// Directives for the whole target, in emission order.
    ///
    /// Top-level entries are not synthesis roots: the target root is
    /// traversed ambiently, so a pass-through top-level directory emits its
    /// own `+ A/`. The closing [`Directive::ambient_exclude`] is not part
    /// of the list.
    pub fn directives(&self) -> Result<Vec<Directive>> {
        check_siblings(self.root(), "")?;
        let mut out = Vec::new();
        for child in self.root().children() {
            emit(child, child.name(), false, &mut out)?;
        }
        Ok(out)
    }

    /// Directives for the subtree at `path`, treating it as the synthesis
    /// root. A path without a node yields no directives.
    pub fn synthesize_at(&self, path: &TreePath) -> Result<Vec<Directive>> {
        match self.get(path) {
            Some(node) => synthesize(node, &path.to_string()),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(directives: &[Directive]) -> Vec<String> {
        directives.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn included_node_ignores_children() {
        let node = Node::new("A")
            .with_state(NodeState::Included)
            .with_child(Node::new("B").with_state(NodeState::Evicted));
        assert_eq!(lines(&synthesize(&node, "A").unwrap()), ["+ A/"]);
    }

    #[test]
    fn default_leaf_emits_nothing() {
        let node = Node::new("A").with_child(Node::new("B").with_state(NodeState::Evicted));
        assert!(synthesize(&node, "A").unwrap().is_empty());
    }

    #[test]
    fn evicted_with_only_evicted_children_is_a_leaf() {
        let node = Node::new("A")
            .with_state(NodeState::Evicted)
            .with_child(Node::new("B").with_state(NodeState::Evicted));
        assert_eq!(lines(&synthesize(&node, "A").unwrap()), ["- A"]);
    }

    #[test]
    fn evicted_sibling_of_included_is_kept() {
        let node = Node::new("A")
            .with_child(Node::new("old").with_state(NodeState::Evicted))
            .with_child(Node::new("new").with_state(NodeState::Included));
        assert_eq!(
            lines(&synthesize(&node, "A").unwrap()),
            ["- A/old", "+ A/new/", "- A/*"]
        );
    }

    #[test]
    fn duplicate_children_are_corruption() {
        let node = Node::new("A")
            .with_child(Node::new("B").with_state(NodeState::Included))
            .with_child(Node::new("B").with_state(NodeState::Evicted));
        let err = synthesize(&node, "A").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn invalid_child_name_is_corruption() {
        let node = Node::new("A").with_child(Node::new("x/y").with_state(NodeState::Included));
        assert!(matches!(
            synthesize(&node, "A"),
            Err(Error::TreeCorruption { .. })
        ));
    }
}
