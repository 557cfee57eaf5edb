//! Pre-filtering of lines the LCS search does not need to see.
//!
//! A line with no match at all in the other input can only be part of a
//! change, and a line matching very many lines (blank lines, lone braces)
//! mostly adds noise to the search. Removing both kinds up front keeps the
//! diagonal search small without affecting which lines end up matched.

use crate::Lin;
use crate::artifacts::core::error::{DiffError, reserve};
use crate::artifacts::diff::change::ChangeFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Discard {
    Keep,
    Certain,
    Provisional,
}

/// The lines of one input that survived discarding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Survivors {
    /// Class ids of the kept lines, in order.
    pub undiscarded: Vec<Lin>,
    /// Position of each kept line in the full input.
    pub real_indexes: Vec<Lin>,
}

/// Split both inputs into the lines handed to the LCS engine and the lines
/// marked changed right away (written into `changed`).
///
/// With `minimal` set nothing is discarded.
pub fn discard_confusing_lines(
    equivs: [&[Lin]; 2],
    equiv_max: Lin,
    minimal: bool,
    changed: &mut [ChangeFlags; 2],
) -> Result<[Survivors; 2], DiffError> {
    let counts = [count_classes(equivs[0], equiv_max)?, count_classes(equivs[1], equiv_max)?];

    let mut discards = [
        mark_candidates(equivs[0], &counts[1]),
        mark_candidates(equivs[1], &counts[0]),
    ];
    for marks in &mut discards {
        confirm_provisional(marks);
    }

    let mut survivors: [Survivors; 2] = Default::default();
    for f in 0..2 {
        let kept = &mut survivors[f];
        reserve(&mut kept.undiscarded, equivs[f].len(), "discard tables")?;
        reserve(&mut kept.real_indexes, equivs[f].len(), "discard tables")?;

        for (i, (&class, &mark)) in equivs[f].iter().zip(&discards[f]).enumerate() {
            if minimal || mark == Discard::Keep {
                kept.undiscarded.push(class);
                kept.real_indexes.push(i as Lin);
            } else {
                changed[f][i as Lin] = true;
            }
        }
    }

    tracing::trace!(
        kept0 = survivors[0].undiscarded.len(),
        kept1 = survivors[1].undiscarded.len(),
        "discarded confusing lines"
    );
    Ok(survivors)
}

fn count_classes(equivs: &[Lin], equiv_max: Lin) -> Result<Vec<Lin>, DiffError> {
    let mut counts = Vec::new();
    reserve(&mut counts, equiv_max as usize, "class counts")?;
    counts.resize(equiv_max as usize, 0);
    for &class in equivs {
        counts[class as usize] += 1;
    }
    Ok(counts)
}

/// Lines with no match in the other input are certain discards; lines
/// matching more than about `5 * sqrt(n / 64)` others are provisional.
fn mark_candidates(equivs: &[Lin], other_counts: &[Lin]) -> Vec<Discard> {
    let mut many: Lin = 5;
    let mut tem = equivs.len() / 64;
    loop {
        tem >>= 2;
        if tem == 0 {
            break;
        }
        many *= 2;
    }

    equivs
        .iter()
        .map(|&class| match other_counts[class as usize] {
            0 => Discard::Certain,
            n if n > many => Discard::Provisional,
            _ => Discard::Keep,
        })
        .collect()
}

/// Provisional discards only stand in the middle of a run of discards that
/// starts and ends with certain ones, and not where they cluster.
fn confirm_provisional(discards: &mut [Discard]) {
    let end = discards.len();
    let mut i = 0;

    while i < end {
        match discards[i] {
            Discard::Provisional => discards[i] = Discard::Keep,
            Discard::Keep => {}
            Discard::Certain => {
                // Find the end of this run, counting its provisionals.
                let mut j = i;
                let mut provisional = 0;
                while j < end && discards[j] != Discard::Keep {
                    if discards[j] == Discard::Provisional {
                        provisional += 1;
                    }
                    j += 1;
                }

                // Provisionals at the tail of the run do not count.
                while j > i && discards[j - 1] == Discard::Provisional {
                    j -= 1;
                    discards[j] = Discard::Keep;
                    provisional -= 1;
                }

                let length = j - i;
                if provisional * 4 > length {
                    discards[i..j]
                        .iter_mut()
                        .filter(|d| **d == Discard::Provisional)
                        .for_each(|d| *d = Discard::Keep);
                } else {
                    trim_run(&mut discards[i..j]);
                }

                i = j.max(i + 1) - 1;
            }
        }
        i += 1;
    }
}

fn trim_run(run: &mut [Discard]) {
    let length = run.len();

    // A subrun of `minimum` or more provisionals is cancelled: two can
    // stand once the run is 16 lines long, four once it is 64.
    let mut minimum = 1;
    let mut tem = length >> 2;
    loop {
        tem >>= 2;
        if tem == 0 {
            break;
        }
        minimum <<= 1;
    }
    minimum += 1;

    let mut consec = 0;
    let mut j = 0;
    while j < length {
        if run[j] != Discard::Provisional {
            consec = 0;
        } else {
            consec += 1;
            if consec == minimum {
                // Back up to the start of the subrun and cancel all of it.
                j -= consec;
            } else if consec > minimum {
                run[j] = Discard::Keep;
            }
        }
        j += 1;
    }

    // From each end, cancel provisionals until three certain discards in a
    // row are found, or the first certain one at least 8 lines in.
    scan_run_end(run.iter_mut());
    scan_run_end(run.iter_mut().rev());
}

fn scan_run_end<'a>(run: impl Iterator<Item = &'a mut Discard>) {
    let mut consec = 0;
    for (j, mark) in run.enumerate() {
        if j >= 8 && *mark == Discard::Certain {
            break;
        }
        match *mark {
            Discard::Provisional => {
                consec = 0;
                *mark = Discard::Keep;
            }
            Discard::Keep => consec = 0,
            Discard::Certain => consec += 1,
        }
        if consec == 3 {
            break;
        }
    }
}
