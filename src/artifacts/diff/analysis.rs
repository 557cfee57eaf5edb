use crate::Lin;
use crate::artifacts::core::error::DiffError;
use crate::artifacts::diff::change::{ChangeFlags, EditScript};
use crate::artifacts::diff::discard::discard_confusing_lines;
use crate::artifacts::diff::lcs::{EditSink, LcsEngine};
use crate::artifacts::diff::shift::shift_boundaries;
use crate::artifacts::lines::equivalence::classify_pair;
use crate::artifacts::lines::line_table::LineTable;
use crate::artifacts::options::DiffOptions;
use std::ops::Range;

/// Translates the engine's positions among surviving lines back to line
/// positions in the compared region.
struct RealIndexSink<'a> {
    real_indexes: [&'a [Lin]; 2],
    changed: &'a mut [ChangeFlags; 2],
}

impl EditSink for RealIndexSink<'_> {
    fn note_delete(&mut self, x: Lin) {
        self.changed[0][self.real_indexes[0][x as usize]] = true;
    }

    fn note_insert(&mut self, y: Lin) {
        self.changed[1][self.real_indexes[1][y as usize]] = true;
    }
}

/// The region of each input left after dropping identical leading and
/// trailing lines, widened by `horizon` unchanged lines on each side.
pub fn identical_ends(tables: [&LineTable; 2], horizon: Lin) -> [Range<Lin>; 2] {
    let [a, b] = tables;
    let (len0, len1) = (a.len(), b.len());
    let shorter = len0.min(len1);

    let mut prefix = 0;
    while prefix < shorter && a.line(prefix) == b.line(prefix) {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < shorter - prefix && a.line(len0 - 1 - suffix) == b.line(len1 - 1 - suffix) {
        suffix += 1;
    }

    let prefix = (prefix - horizon).max(0);
    let suffix = (suffix - horizon).max(0);
    [prefix..len0 - suffix, prefix..len1 - suffix]
}

/// Compute the edit script turning `tables[0]` into `tables[1]`.
///
/// Identical ends are trimmed, the remaining lines classified, lines that
/// cannot match discarded, the LCS search run on the rest and the resulting
/// boundaries shifted to canonical positions.
pub fn diff_tables(tables: [&LineTable; 2], options: &DiffOptions) -> Result<EditScript, DiffError> {
    let [range0, range1] = identical_ends(tables, options.horizon());
    tracing::debug!(
        prefix = range0.start,
        compared0 = range0.end - range0.start,
        compared1 = range1.end - range1.start,
        "trimmed identical ends"
    );

    let (start0, start1) = (range0.start, range1.start);
    let classes = classify_pair(tables, [range0, range1], options.fold_rules())?;
    let [equivs0, equivs1] = &classes.equivs;

    let mut changed = [
        ChangeFlags::new(equivs0.len() as Lin)?,
        ChangeFlags::new(equivs1.len() as Lin)?,
    ];
    let survivors = discard_confusing_lines([equivs0, equivs1], classes.equiv_max, options.minimal, &mut changed)?;

    let mut engine = LcsEngine::new(
        &survivors[0].undiscarded,
        &survivors[1].undiscarded,
        options.speed_large_files,
    )?;
    let mut sink = RealIndexSink {
        real_indexes: [&survivors[0].real_indexes, &survivors[1].real_indexes],
        changed: &mut changed,
    };
    engine.compare(options.minimal, &mut sink);

    shift_boundaries([equivs0, equivs1], &mut changed);

    let script = EditScript::from_flags(&changed[0], &changed[1]).offset(start0, start1);
    tracing::debug!(changes = script.len(), "built edit script");

    Ok(script)
}
