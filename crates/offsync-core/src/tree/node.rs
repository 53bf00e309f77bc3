//! Path-segment nodes

use serde::{Deserialize, Serialize};

use super::TreePath;

/// Explicit decision recorded on a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// No decision here; the node only exists to reach its children
    #[default]
    Default,
    /// The whole subtree is synchronized
    Included,
    /// The whole subtree is kept out of synchronization
    Evicted,
}

/// One path segment of a [`PathTree`](super::PathTree).
///
/// Children keep their declaration order, which is also the order in
/// which their directives are emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    name: String,
    state: NodeState,
    children: Vec<Node>,
}

impl Node {
    /// Create a node in the `Default` state.
    ///
    /// Names are not validated here; synthesis reports malformed trees as
    /// corruption.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: NodeState::Default,
            children: Vec::new(),
        }
    }

    /// Builder: set the state.
    pub fn with_state(mut self, state: NodeState) -> Self {
        self.state = state;
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        self.state = state;
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Get the named child, appending a `Default` placeholder if missing.
    pub(crate) fn child_or_insert(&mut self, name: &str) -> &mut Node {
        let idx = match self.children.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.children.push(Node::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    pub(crate) fn remove_child(&mut self, name: &str) -> Option<Node> {
        let pos = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(pos))
    }

    /// Drop every node beneath this one, returning how many marks were lost.
    pub(crate) fn clear_children(&mut self) -> usize {
        let marks = self.children.iter().map(Node::mark_count).sum();
        self.children.clear();
        marks
    }

    /// Number of explicit marks in this subtree, including this node.
    pub(crate) fn mark_count(&self) -> usize {
        let own = usize::from(self.state != NodeState::Default);
        own + self.children.iter().map(Node::mark_count).sum::<usize>()
    }

    /// Holds no decision and leads to none.
    pub(crate) fn is_prunable(&self) -> bool {
        self.state == NodeState::Default && self.children.is_empty()
    }

    pub(crate) fn descend(&self, path: &TreePath) -> Option<&Node> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    pub(crate) fn descend_mut(&mut self, path: &TreePath) -> Option<&mut Node> {
        let mut node = self;
        for segment in path.segments() {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    /// Walk to `path`, creating `Default` placeholders on the way.
    pub(crate) fn ensure(&mut self, path: &TreePath) -> &mut Node {
        let mut node = self;
        for segment in path.segments() {
            node = node.child_or_insert(segment);
        }
        node
    }

    /// Paths of the topmost Included nodes strictly beneath this one.
    ///
    /// `base` is the path of `self`.
    pub(crate) fn included_descendants(&self, base: &TreePath) -> Vec<TreePath> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_included(base.child(&child.name), &mut found);
        }
        found
    }

    fn collect_included(&self, path: TreePath, found: &mut Vec<TreePath>) {
        if self.state == NodeState::Included {
            found.push(path);
            return;
        }
        for child in &self.children {
            child.collect_included(path.child(&child.name), found);
        }
    }
}
