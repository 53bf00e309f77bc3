//! Rule Synthesizer
//!
//! Turns a [`PathTree`](crate::tree::PathTree) into an ordered list of
//! directives for a first-match-wins path filter. Deeper directives always
//! precede shallower and wildcard ones, so the first matching directive for
//! any path is the most specific decision made about it.
//!
//! Synthesis is recomputed on demand from the tree; it is pure, linear in
//! tree size and deterministic.

mod directive;
mod synth;

pub use directive::{Directive, Pattern, Polarity};
pub use synth::synthesize;
