use crate::Lin;
use crate::artifacts::lines::equivalence::is_space;
use crate::artifacts::lines::line_table::LineTable;
use regex::bytes::Regex;
use std::cell::Cell;

/// Longest caption printed after a hunk header.
const CAPTION_WIDTH: usize = 40;

/// Finds the line a hunk belongs to (`-p`, `-F`): the nearest line above
/// the hunk matching the function pattern.
///
/// Hunks are visited in order, so each search only scans the lines between
/// the previous hunk and this one, falling back to the previous match.
#[derive(Debug)]
pub struct FunctionFinder<'a> {
    table: &'a LineTable,
    regex: Option<&'a Regex>,
    last_search: Cell<Lin>,
    last_match: Cell<Option<Lin>>,
}

impl<'a> FunctionFinder<'a> {
    pub fn new(table: &'a LineTable, regex: Option<&'a Regex>) -> Self {
        FunctionFinder {
            table,
            regex,
            last_search: Cell::new(0),
            last_match: Cell::new(None),
        }
    }

    /// Caption for a hunk whose first printed line is `line`.
    pub fn caption(&self, line: Lin) -> Option<&'a [u8]> {
        let regex = self.regex?;
        let last = self.last_search.replace(line);

        let found = (last..line)
            .rev()
            .find(|&i| regex.is_match(self.table.content(i)));
        if found.is_some() {
            self.last_match.set(found);
        }

        self.last_match.get().map(|i| trim_caption(self.table.content(i)))
    }
}

fn trim_caption(text: &[u8]) -> &[u8] {
    let start = text.iter().position(|&b| !is_space(b)).unwrap_or(text.len());
    let text = &text[start..];
    let text = &text[..text.len().min(CAPTION_WIDTH)];
    let end = text.iter().rposition(|&b| !is_space(b)).map_or(0, |i| i + 1);
    &text[..end]
}
