//! Validated paths relative to a target root

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Check a single path segment.
///
/// Returns the reason the name is unusable, if any.
pub(crate) fn name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("empty path segment")
    } else if name.contains('/') {
        Some("segment contains '/'")
    } else if name.contains('\0') {
        Some("segment contains NUL")
    } else if name == "." || name == ".." {
        Some("'.' and '..' segments are not allowed")
    } else {
        None
    }
}

/// A non-empty path inside a target, such as `media/music/live`.
///
/// Paths are relative to the target root: a leading `/` is rejected, a
/// single trailing `/` is accepted and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    /// Parse and validate a relative path.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("path is empty"));
        }
        if raw.starts_with('/') {
            return Err(invalid("path must be relative to the target root"));
        }

        let trimmed = raw.strip_suffix('/').unwrap_or(raw);
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if let Some(reason) = name_problem(segment) {
                return Err(invalid(reason));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The enclosing path, or `None` for a top-level entry.
    pub fn parent(&self) -> Option<TreePath> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append a validated child name.
    pub(crate) fn child(&self, name: &str) -> TreePath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// The path made of the first `len` segments.
    pub(crate) fn prefix(&self, len: usize) -> TreePath {
        Self {
            segments: self.segments[..len].to_vec(),
        }
    }

    /// Whether `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &TreePath) -> bool {
        self.segments.len() < other.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for TreePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for TreePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A", &["A"])]
    #[case("A/B/C", &["A", "B", "C"])]
    #[case("A/B/", &["A", "B"])]
    #[case("füchen/∀x∈X", &["füchen", "∀x∈X"])]
    fn parses_segments(#[case] raw: &str, #[case] expected: &[&str]) {
        let path = TreePath::parse(raw).unwrap();
        assert_eq!(path.segments(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("/A")]
    #[case("A//B")]
    #[case("A/./B")]
    #[case("A/../B")]
    #[case("..")]
    #[case("A\0B")]
    #[case("/")]
    #[case("A//")]
    fn rejects_malformed(#[case] raw: &str) {
        assert!(matches!(
            TreePath::parse(raw),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn display_round_trips() {
        let path: TreePath = "media/music/live/".parse().unwrap();
        assert_eq!(path.to_string(), "media/music/live");
    }

    #[test]
    fn parent_and_name() {
        let path = TreePath::parse("A/B/C").unwrap();
        assert_eq!(path.name(), "C");
        assert_eq!(path.parent(), Some(TreePath::parse("A/B").unwrap()));
        assert_eq!(TreePath::parse("A").unwrap().parent(), None);
    }

    #[test]
    fn ancestry_is_strict_and_per_segment() {
        let a = TreePath::parse("A").unwrap();
        let ab = TreePath::parse("A/B").unwrap();
        let abc = TreePath::parse("AB/C").unwrap();
        assert!(a.is_ancestor_of(&ab));
        assert!(!a.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&abc));
        assert!(!ab.is_ancestor_of(&a));
    }
}
