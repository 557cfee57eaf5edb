//! Line-oriented file comparison
//!
//! `ldiff` computes a minimal edit script between two sequences of lines and
//! renders it in the classic textual formats (normal, context, unified, ed,
//! forward ed, RCS and side by side).
//!
//! The crate is organized the same way the binary runs:
//!
//! - `areas`: stateful collaborators (the comparison session, file access, signals)
//! - `artifacts`: the data model and algorithms (line tables, the LCS engine,
//!   hunks and renderers)
//! - `commands`: comparison operations composed from the two above

use clap::ValueEnum;

pub mod areas;
pub mod artifacts;
pub mod commands;

#[cfg(test)]
pub(crate) mod testing;

/// Line counts and line indices.
///
/// Signed so that an empty range can be expressed as `last == first - 1`.
pub type Lin = isize;

/// Output format selected for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Normal,
    Context,
    Unified,
    Ed,
    ForwardEd,
    Rcs,
    SideBySide,
}

impl OutputStyle {
    /// Styles that can express a final line without a newline.
    pub fn is_robust(self) -> bool {
        !matches!(self, OutputStyle::Ed | OutputStyle::ForwardEd)
    }
}

/// How much horizontal white space matters when comparing lines.
///
/// The order matters: later variants ignore strictly more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WhiteSpace {
    #[default]
    Significant,
    TabExpansion,
    TrailingSpace,
    TabExpansionAndTrailingSpace,
    SpaceChange,
    AllSpace,
}

impl WhiteSpace {
    /// Combine `-E` and `-Z`, which are independent of each other.
    pub fn with(self, other: WhiteSpace) -> WhiteSpace {
        use WhiteSpace::*;
        match (self, other) {
            (TabExpansion, TrailingSpace) | (TrailingSpace, TabExpansion) => {
                TabExpansionAndTrailingSpace
            }
            (a, b) => a.max(b),
        }
    }
}

/// When colored output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Never,
    Auto,
    Always,
}

#[cfg(test)]
mod tests {
    use super::WhiteSpace;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(WhiteSpace::TabExpansion, WhiteSpace::TrailingSpace, WhiteSpace::TabExpansionAndTrailingSpace)]
    #[case(WhiteSpace::TrailingSpace, WhiteSpace::TabExpansion, WhiteSpace::TabExpansionAndTrailingSpace)]
    #[case(WhiteSpace::TabExpansion, WhiteSpace::SpaceChange, WhiteSpace::SpaceChange)]
    #[case(WhiteSpace::AllSpace, WhiteSpace::Significant, WhiteSpace::AllSpace)]
    fn white_space_modes_combine(
        #[case] a: WhiteSpace,
        #[case] b: WhiteSpace,
        #[case] expected: WhiteSpace,
    ) {
        assert_eq!(a.with(b), expected);
    }
}
