//! Core layer of offsync
//!
//! offsync keeps selected parts of a remote tree in a local directory and
//! drives rsync with generated filter rules. This crate provides:
//!
//! - **Path trees**: per-target include/evict decisions ([`tree`])
//! - **Rule synthesis**: the ordered filter directives derived from a tree
//!   ([`rules`])
//! - **Targets and registry**: configured source/root pairs and their
//!   persistence ([`target`], [`registry`])
//! - **Settings**: user configuration and the configuration directory
//!   ([`settings`])
//! - **Transfer**: assembling and running the rsync invocation
//!   ([`transfer`])
//!
//! # Example
//!
//! ```
//! use offsync_core::tree::{PathTree, TreePath};
//!
//! let mut tree = PathTree::new();
//! tree.include(&TreePath::parse("photos/2019").unwrap()).unwrap();
//!
//! let lines: Vec<String> = tree
//!     .directives()
//!     .unwrap()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(lines, ["+ photos/2019/", "- photos/*", "+ photos/"]);
//! ```

pub mod error;
pub mod registry;
pub mod rules;
pub mod settings;
pub mod target;
pub mod transfer;
pub mod tree;

pub use error::{Error, Result};
pub use registry::Registry;
pub use rules::{Directive, Pattern, Polarity, synthesize};
pub use settings::{ConfigDir, Settings, TransferSettings};
pub use target::Target;
pub use transfer::{Direction, DryRun, TransferOptions, TransferPlan, TransferReport};
pub use tree::{Node, NodeState, PathTree, Ruling, TreePath};
