use crate::Lin;
use crate::artifacts::diff::change::ChangeFlags;

/// Slide runs of changed lines to canonical positions.
///
/// A run whose last line equals the unchanged line before it can move up
/// by one without changing the script's meaning, and likewise down. Each
/// run is first moved up to merge with earlier runs, then down as far as
/// possible, and finally back up until it lines up with a run in the other
/// input, so that insertions and deletions pair into replacements.
pub fn shift_boundaries(equivs: [&[Lin]; 2], changed: &mut [ChangeFlags; 2]) {
    for f in 0..2 {
        let [first, second] = &mut *changed;
        let (this, other) = if f == 0 {
            (first, &*second)
        } else {
            (second, &*first)
        };
        shift_file(equivs[f], this, other);
    }
}

fn shift_file(equivs: &[Lin], changed: &mut ChangeFlags, other: &ChangeFlags) {
    let i_end = equivs.len() as Lin;
    let class = |i: Lin| equivs[i as usize];
    let mut i: Lin = 0;
    let mut j: Lin = 0;

    loop {
        // Find the start of the next run, tracking the matching point in
        // the other input.
        while i < i_end && !changed[i] {
            while other[j] {
                j += 1;
            }
            j += 1;
            i += 1;
        }

        if i == i_end {
            break;
        }

        let mut start = i;

        // And its end.
        i += 1;
        while changed[i] {
            i += 1;
        }
        while other[j] {
            j += 1;
        }

        let mut corresponding;
        loop {
            let run_length = i - start;

            // Move the run up while the line above equals its last line.
            // This merges it with earlier runs.
            while start > 0 && class(start - 1) == class(i - 1) {
                start -= 1;
                changed[start] = true;
                i -= 1;
                changed[i] = false;
                while changed[start - 1] {
                    start -= 1;
                }
                j -= 1;
                while other[j] {
                    j -= 1;
                }
            }

            // The last point where the run ends next to a run of the other
            // input; `i_end` if there is none.
            corresponding = if other[j - 1] { i } else { i_end };

            // Then move it down as far as it goes, merging with later runs.
            while i != i_end && class(start) == class(i) {
                changed[start] = false;
                start += 1;
                changed[i] = true;
                i += 1;
                while changed[i] {
                    i += 1;
                }
                j += 1;
                while other[j] {
                    j += 1;
                    corresponding = i;
                }
            }

            if run_length == i - start {
                break;
            }
        }

        // Move the fully merged run back up to line up with the other
        // input's run, if there is one.
        while corresponding < i {
            start -= 1;
            changed[start] = true;
            i -= 1;
            changed[i] = false;
            j -= 1;
            while other[j] {
                j -= 1;
            }
        }
    }
}
