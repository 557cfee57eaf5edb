//! Color contexts and palette
//!
//! Colored output wraps each category of output line (file headers, line
//! numbers, added and deleted lines) in an SGR sequence taken from a
//! [`Palette`](palette::Palette). The renderers only ever say which
//! [`ColorContext`] they are entering; the session decides whether and what
//! to emit.

pub mod palette;

/// Category of the text about to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorContext {
    Header,
    Add,
    Delete,
    Reset,
    LineNumber,
}
