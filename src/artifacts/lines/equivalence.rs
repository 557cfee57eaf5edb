use crate::artifacts::core::error::{DiffError, reserve};
use crate::artifacts::lines::line_table::LineTable;
use crate::{Lin, WhiteSpace};
use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;

/// Rules deciding when two lines compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldRules {
    pub ignore_case: bool,
    pub white_space: WhiteSpace,
    pub tab_size: usize,
}

impl Default for FoldRules {
    fn default() -> Self {
        FoldRules {
            ignore_case: false,
            white_space: WhiteSpace::Significant,
            tab_size: 8,
        }
    }
}

impl FoldRules {
    /// Canonical form of `line` (without its newline) under these rules.
    ///
    /// Two lines are equal exactly when their canonical forms are.
    pub fn fold<'a>(&self, line: &'a [u8]) -> Cow<'a, [u8]> {
        if !self.ignore_case && self.white_space == WhiteSpace::Significant {
            return Cow::Borrowed(line);
        }

        let mut folded = match self.white_space {
            WhiteSpace::Significant => line.to_vec(),
            WhiteSpace::AllSpace => line
                .iter()
                .copied()
                .filter(|&b| !is_space(b))
                .collect(),
            WhiteSpace::SpaceChange => collapse_space(line),
            WhiteSpace::TrailingSpace => trim_trailing_space(line).to_vec(),
            WhiteSpace::TabExpansion => expand_tabs(line, self.tab_size),
            WhiteSpace::TabExpansionAndTrailingSpace => {
                expand_tabs(trim_trailing_space(line), self.tab_size)
            }
        };

        if self.ignore_case {
            folded.make_ascii_lowercase();
        }
        Cow::Owned(folded)
    }

    /// A missing final newline is trailing white space like any other, so
    /// it only counts while trailing space does.
    pub fn keeps_final_newline(&self) -> bool {
        self.white_space < WhiteSpace::TrailingSpace
    }
}

pub(crate) fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

fn trim_trailing_space(line: &[u8]) -> &[u8] {
    let end = line.iter().rposition(|&b| !is_space(b)).map_or(0, |i| i + 1);
    &line[..end]
}

/// Drop leading and trailing white space and squeeze interior runs into a
/// single space.
fn collapse_space(line: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    let mut pending_space = false;

    for &b in line {
        if is_space(b) {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(b' ');
                pending_space = false;
            }
            out.push(b);
        }
    }
    out
}

fn expand_tabs(line: &[u8], tab_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    let mut column = 0usize;

    for &b in line {
        match b {
            b'\t' => {
                let spaces = tab_size - column % tab_size;
                out.extend(std::iter::repeat_n(b' ', spaces));
                column += spaces;
            }
            b'\r' => {
                out.push(b);
                column = 0;
            }
            0x08 => {
                out.push(b);
                column = column.saturating_sub(1);
            }
            _ => {
                out.push(b);
                column += 1;
            }
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClassKey<'a> {
    text: Cow<'a, [u8]>,
    incomplete: bool,
}

/// Class ids of the compared region of both inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub equivs: [Vec<Lin>; 2],
    /// One past the largest class id handed out.
    pub equiv_max: Lin,
}

/// Assigns class ids to lines, sharing one id space across both inputs.
///
/// Ids start at 1. The class table is a hash map keyed by the folded text,
/// so lines whose hashes collide are still told apart by comparing keys.
#[derive(Debug)]
pub struct EquivalenceClassifier<'a> {
    rules: FoldRules,
    classes: HashMap<ClassKey<'a>, Lin>,
    next_class: Lin,
}

impl<'a> EquivalenceClassifier<'a> {
    pub fn new(rules: FoldRules) -> Self {
        EquivalenceClassifier {
            rules,
            classes: HashMap::new(),
            next_class: 1,
        }
    }

    /// Class id of each line of `table` within `range`.
    pub fn classify(&mut self, table: &'a LineTable, range: Range<Lin>) -> Result<Vec<Lin>, DiffError> {
        let mut equivs = Vec::new();
        reserve(&mut equivs, (range.end - range.start).max(0) as usize, "equivalence classes")?;

        for i in range {
            let key = ClassKey {
                text: self.rules.fold(table.content(i)),
                incomplete: self.rules.keeps_final_newline() && !table.has_newline(i),
            };
            let next_class = &mut self.next_class;
            let class = *self.classes.entry(key).or_insert_with(|| {
                let class = *next_class;
                *next_class += 1;
                class
            });
            equivs.push(class);
        }

        Ok(equivs)
    }

    pub fn equiv_max(&self) -> Lin {
        self.next_class
    }
}

/// Classify `ranges[0]` of `tables[0]` and `ranges[1]` of `tables[1]`.
pub fn classify_pair(
    tables: [&LineTable; 2],
    ranges: [Range<Lin>; 2],
    rules: FoldRules,
) -> Result<Classification, DiffError> {
    let [range0, range1] = ranges;
    let mut classifier = EquivalenceClassifier::new(rules);
    let equivs0 = classifier.classify(tables[0], range0)?;
    let equivs1 = classifier.classify(tables[1], range1)?;

    Ok(Classification {
        equivs: [equivs0, equivs1],
        equiv_max: classifier.equiv_max(),
    })
}
