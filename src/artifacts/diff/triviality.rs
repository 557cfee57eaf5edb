use crate::artifacts::diff::change::{Change, EditScript};
use crate::artifacts::diff::hunk::{HunkPolicy, Hunks};
use crate::artifacts::lines::equivalence::is_space;
use crate::artifacts::lines::line_table::LineTable;
use crate::artifacts::options::DiffOptions;
use crate::{Lin, WhiteSpace};
use bitflags::bitflags;
use regex::bytes::Regex;

bitflags! {
    /// Which sides of a hunk have lines worth showing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Changes: u8 {
        /// Lines deleted from A.
        const OLD = 0b01;
        /// Lines inserted from B.
        const NEW = 0b10;
        const CHANGED = Self::OLD.bits() | Self::NEW.bits();
    }
}

impl Changes {
    /// The ed command letter for this kind of hunk.
    pub fn letter(self) -> char {
        if self == Changes::OLD {
            'd'
        } else if self == Changes::NEW {
            'a'
        } else {
            'c'
        }
    }
}

/// Line range covered by a hunk in each input, and what it changes.
///
/// An empty range has `last == first - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkBounds {
    pub first0: Lin,
    pub last0: Lin,
    pub first1: Lin,
    pub last1: Lin,
    pub changes: Changes,
}

/// Decides which changes consist solely of lines the options say to ignore.
#[derive(Debug, Clone)]
pub struct TrivialityFilter<'a> {
    tables: [&'a LineTable; 2],
    ignore_blank_lines: bool,
    /// All-white-space lines count as blank.
    skip_white_space: bool,
    ignore_regex: Option<&'a Regex>,
}

impl<'a> TrivialityFilter<'a> {
    pub fn new(tables: [&'a LineTable; 2], options: &'a DiffOptions) -> Self {
        TrivialityFilter {
            tables,
            ignore_blank_lines: options.ignore_blank_lines,
            skip_white_space: options.ignore_blank_lines && options.white_space >= WhiteSpace::TrailingSpace,
            ignore_regex: options.ignore_regex.as_ref(),
        }
    }

    /// Whether any line could be trivial at all.
    pub fn is_active(&self) -> bool {
        self.ignore_blank_lines || self.ignore_regex.is_some()
    }

    pub fn is_trivial_line(&self, file: usize, i: Lin) -> bool {
        let content = self.tables[file].content(i);

        let blank = content.is_empty() || (self.skip_white_space && content.iter().all(|&b| is_space(b)));
        if self.ignore_blank_lines && blank {
            return true;
        }

        self.ignore_regex.is_some_and(|regex| regex.is_match(content))
    }

    /// Bounds and kind of the hunk made of `hunk`'s changes.
    ///
    /// When every deleted and inserted line is trivial the kind is empty and
    /// the hunk should not be shown.
    pub fn analyze(&self, hunk: &[Change]) -> HunkBounds {
        let (Some(first), Some(last)) = (hunk.first(), hunk.last()) else {
            return HunkBounds {
                first0: 0,
                last0: -1,
                first1: 0,
                last1: -1,
                changes: Changes::empty(),
            };
        };

        let mut trivial = self.is_active();
        let (mut show_from, mut show_to) = (0, 0);
        for change in hunk {
            show_from += change.deleted;
            show_to += change.inserted;

            trivial = trivial
                && (change.line0..change.end0()).all(|i| self.is_trivial_line(0, i))
                && (change.line1..change.end1()).all(|i| self.is_trivial_line(1, i));
        }

        let mut changes = Changes::empty();
        if !trivial {
            changes.set(Changes::OLD, show_from > 0);
            changes.set(Changes::NEW, show_to > 0);
        }

        HunkBounds {
            first0: first.line0,
            last0: last.end0() - 1,
            first1: first.line1,
            last1: last.end1() - 1,
            changes,
        }
    }

    /// Whether some hunk of `script`, cut without context, is worth
    /// showing. This decides whether two inputs differ.
    pub fn has_real_changes(&self, script: &EditScript) -> bool {
        if !self.is_active() {
            return !script.is_empty();
        }

        Hunks::new(script, HunkPolicy::new(0)).any(|hunk| !self.analyze(hunk).changes.is_empty())
    }

    /// Flag every change that is trivial on its own.
    pub fn mark_ignorable(&self, script: &mut EditScript) {
        for change in script.changes_mut() {
            change.ignore = self.analyze(std::slice::from_ref(change)).changes.is_empty();
        }
    }
}
