//! Filter directives in the transfer tool's first-match-wins grammar

use std::fmt;

use serde::{Serialize, Serializer};

/// Whether a matching path is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Include,
    Exclude,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "+",
            Self::Exclude => "-",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path pattern relative to the target root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// `path/`: the directory itself, so the tool descends into it
    Directory(String),
    /// `path/*`: everything directly inside the directory
    Contents(String),
    /// `path`: exactly this entry
    Exact(String),
}

impl Pattern {
    /// The path the pattern is built on.
    pub fn path(&self) -> &str {
        match self {
            Self::Directory(path) | Self::Contents(path) | Self::Exact(path) => path,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Self::Directory(_) => "/",
            Self::Contents(_) => "/*",
            Self::Exact(_) => "",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.path(), self.suffix())
    }
}

/// One ordered include/exclude rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directive {
    pub polarity: Polarity,
    pub pattern: Pattern,
}

impl Directive {
    pub fn include(pattern: Pattern) -> Self {
        Self {
            polarity: Polarity::Include,
            pattern,
        }
    }

    pub fn exclude(pattern: Pattern) -> Self {
        Self {
            polarity: Polarity::Exclude,
            pattern,
        }
    }

    /// `- /*`: the blanket exclusion closing every target's rule list.
    pub fn ambient_exclude() -> Self {
        Self::exclude(Pattern::Contents(String::new()))
    }

    /// Form written to the filter file, anchored at the transfer root.
    ///
    /// `+ A/B/` becomes `+ /A/B/`. Names holding wildcard characters are
    /// backslash-escaped so they only match themselves.
    pub fn anchored(&self) -> String {
        if self.pattern.path().is_empty() {
            return self.to_string();
        }

        let path = self.pattern.path();
        // The tool only honours backslashes in patterns that contain a wildcard
        let matched_as_wildcard =
            matches!(self.pattern, Pattern::Contents(_)) || path.contains(WILDCARDS);
        let path = if matched_as_wildcard {
            escape_wildcards(path)
        } else {
            path.to_string()
        };
        format!("{} /{}{}", self.polarity, path, self.pattern.suffix())
    }
}

const WILDCARDS: &[char] = &['*', '?', '['];

fn escape_wildcards(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '\\' || WILDCARDS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.polarity, self.pattern)
    }
}

impl Serialize for Directive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Directive::include(Pattern::Directory("A/B".into())), "+ A/B/", "+ /A/B/")]
    #[case(Directive::exclude(Pattern::Contents("A/B".into())), "- A/B/*", "- /A/B/*")]
    #[case(Directive::exclude(Pattern::Exact("A".into())), "- A", "- /A")]
    #[case(Directive::ambient_exclude(), "- /*", "- /*")]
    #[case(Directive::include(Pattern::Directory("a*".into())), "+ a*/", r"+ /a\*/")]
    #[case(Directive::exclude(Pattern::Exact("x[1]".into())), "- x[1]", r"- /x\[1]")]
    #[case(Directive::exclude(Pattern::Contents("what?".into())), "- what?/*", r"- /what\?/*")]
    #[case(Directive::exclude(Pattern::Contents(r"a\b".into())), r"- a\b/*", r"- /a\\b/*")]
    #[case(Directive::include(Pattern::Directory(r"a\b".into())), r"+ a\b/", r"+ /a\b/")]
    #[case(Directive::exclude(Pattern::Exact(r"[x]\y".into())), r"- [x]\y", r"- /\[x]\\y")]
    fn renders(#[case] directive: Directive, #[case] plain: &str, #[case] anchored: &str) {
        assert_eq!(directive.to_string(), plain);
        assert_eq!(directive.anchored(), anchored);
    }

    #[test]
    fn serializes_as_line() {
        let directive = Directive::include(Pattern::Directory("media".into()));
        assert_eq!(serde_json::to_string(&directive).unwrap(), "\"+ media/\"");
    }
}
