use crate::Lin;
use crate::artifacts::core::error::{DiffError, reserve};
use std::ops::{Index, IndexMut};

/// A snake at least this long counts as "big" for the speed heuristic.
const SNAKE_LIMIT: Lin = 20;

/// Lower bound of the cost at which [`LcsEngine`] gives up on minimality.
const MIN_TOO_EXPENSIVE: Lin = 4096;

/// Receives the lines the engine decides to delete from A and insert from B.
pub trait EditSink {
    fn note_delete(&mut self, x: Lin);
    fn note_insert(&mut self, y: Lin);
}

/// Where a region is split, and whether each half must still be solved
/// minimally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub xmid: Lin,
    pub ymid: Lin,
    pub lo_minimal: bool,
    pub hi_minimal: bool,
}

/// Furthest-reaching x per diagonal `k = x - y`, addressable by negative
/// diagonals.
#[derive(Debug)]
struct Diagonals {
    values: Vec<Lin>,
    offset: Lin,
}

impl Index<Lin> for Diagonals {
    type Output = Lin;

    fn index(&self, d: Lin) -> &Lin {
        &self.values[(d + self.offset) as usize]
    }
}

impl IndexMut<Lin> for Diagonals {
    fn index_mut(&mut self, d: Lin) -> &mut Lin {
        &mut self.values[(d + self.offset) as usize]
    }
}

#[derive(Debug, Clone, Copy)]
struct Region {
    xoff: Lin,
    xlim: Lin,
    yoff: Lin,
    ylim: Lin,
    minimal: bool,
}

/// Divide-and-conquer O(ND) shortest edit script search.
///
/// Both directions of the middle-snake search share one pair of diagonal
/// arrays, allocated once for the whole comparison and reused by every
/// subproblem.
///
/// ## Example
///
/// ```ignore
/// let mut engine = LcsEngine::new(&xv, &yv, false)?;
/// engine.compare(minimal, &mut sink);
/// ```
#[derive(Debug)]
pub struct LcsEngine<'a> {
    xv: &'a [Lin],
    yv: &'a [Lin],
    fdiag: Diagonals,
    bdiag: Diagonals,
    too_expensive: Lin,
    heuristic: bool,
}

impl<'a> LcsEngine<'a> {
    /// Set up an engine over the class ids `xv` (A) and `yv` (B).
    ///
    /// `heuristic` enables the big-snake shortcut used with
    /// `--speed-large-files`.
    pub fn new(xv: &'a [Lin], yv: &'a [Lin], heuristic: bool) -> Result<Self, DiffError> {
        let too_big = || DiffError::OutOfMemory { what: "diagonal arrays" };
        let (xlen, ylen) = (xv.len() as Lin, yv.len() as Lin);
        let diags = xlen
            .checked_add(ylen)
            .and_then(|n| n.checked_add(3))
            .ok_or_else(too_big)?;

        let fdiag = Self::diagonals(diags, ylen + 1)?;
        let bdiag = Self::diagonals(diags, ylen + 1)?;

        // Roughly the square root of the number of diagonals, as a power of 2.
        let mut too_expensive: Lin = 1;
        let mut remaining = diags;
        while remaining != 0 {
            too_expensive <<= 1;
            remaining >>= 2;
        }

        Ok(LcsEngine {
            xv,
            yv,
            fdiag,
            bdiag,
            too_expensive: too_expensive.max(MIN_TOO_EXPENSIVE),
            heuristic,
        })
    }

    fn diagonals(len: Lin, offset: Lin) -> Result<Diagonals, DiffError> {
        let mut values = Vec::new();
        reserve(&mut values, len as usize, "diagonal arrays")?;
        values.resize(len as usize, 0);
        Ok(Diagonals { values, offset })
    }

    /// Override the cost at which the search settles for a non-minimal
    /// split.
    pub fn with_too_expensive(mut self, too_expensive: Lin) -> Self {
        self.too_expensive = too_expensive.max(1);
        self
    }

    /// Report a shortest (or, past the cost limit, a near-shortest) edit
    /// script from all of `xv` to all of `yv` to `sink`.
    pub fn compare(&mut self, minimal: bool, sink: &mut impl EditSink) {
        let mut pending = vec![Region {
            xoff: 0,
            xlim: self.xv.len() as Lin,
            yoff: 0,
            ylim: self.yv.len() as Lin,
            minimal,
        }];

        while let Some(region) = pending.pop() {
            let Region {
                mut xoff,
                mut xlim,
                mut yoff,
                mut ylim,
                minimal,
            } = region;

            // Slide down the top and up the bottom diagonal.
            while xoff < xlim && yoff < ylim && self.equal(xoff, yoff) {
                xoff += 1;
                yoff += 1;
            }
            while xoff < xlim && yoff < ylim && self.equal(xlim - 1, ylim - 1) {
                xlim -= 1;
                ylim -= 1;
            }

            if xoff == xlim {
                (yoff..ylim).for_each(|y| sink.note_insert(y));
            } else if yoff == ylim {
                (xoff..xlim).for_each(|x| sink.note_delete(x));
            } else {
                let part = self.diag(xoff, xlim, yoff, ylim, minimal);

                // Pushed in reverse so the lower half is solved first.
                pending.push(Region {
                    xoff: part.xmid,
                    xlim,
                    yoff: part.ymid,
                    ylim,
                    minimal: part.hi_minimal,
                });
                pending.push(Region {
                    xoff,
                    xlim: part.xmid,
                    yoff,
                    ylim: part.ymid,
                    minimal: part.lo_minimal,
                });
            }
        }
    }

    fn equal(&self, x: Lin, y: Lin) -> bool {
        self.xv[x as usize] == self.yv[y as usize]
    }

    /// Find the midpoint of the shortest edit script for the region
    /// `[xoff, xlim) x [yoff, ylim)`.
    ///
    /// The forward search starts at the top-left corner and the backward
    /// search at the bottom-right one; they advance one edit step at a time
    /// until a forward path overlaps a backward one on the same diagonal.
    /// Unless `find_minimal` is set, the search may stop early with a good
    /// but not necessarily optimal split once the cost grows too large.
    pub fn diag(&mut self, xoff: Lin, xlim: Lin, yoff: Lin, ylim: Lin, find_minimal: bool) -> Partition {
        let dmin = xoff - ylim;
        let dmax = xlim - yoff;
        let fmid = xoff - yoff;
        let bmid = xlim - ylim;
        let (mut fmin, mut fmax) = (fmid, fmid);
        let (mut bmin, mut bmax) = (bmid, bmid);
        let odd = (fmid - bmid) & 1 != 0;

        self.fdiag[fmid] = xoff;
        self.bdiag[bmid] = xlim;

        let mut c: Lin = 1;
        loop {
            let mut big_snake = false;

            // Extend the forward search by one edit step on each diagonal.
            if fmin > dmin {
                fmin -= 1;
                self.fdiag[fmin - 1] = -1;
            } else {
                fmin += 1;
            }
            if fmax < dmax {
                fmax += 1;
                self.fdiag[fmax + 1] = -1;
            } else {
                fmax -= 1;
            }

            let mut d = fmax;
            while d >= fmin {
                let tlo = self.fdiag[d - 1];
                let thi = self.fdiag[d + 1];
                let x0 = if tlo < thi { thi } else { tlo + 1 };
                let (mut x, mut y) = (x0, x0 - d);

                while x < xlim && y < ylim && self.equal(x, y) {
                    x += 1;
                    y += 1;
                }
                if x - x0 > SNAKE_LIMIT {
                    big_snake = true;
                }
                self.fdiag[d] = x;

                if odd && bmin <= d && d <= bmax && self.bdiag[d] <= x {
                    return Partition {
                        xmid: x,
                        ymid: y,
                        lo_minimal: true,
                        hi_minimal: true,
                    };
                }
                d -= 2;
            }

            // And the backward search.
            if bmin > dmin {
                bmin -= 1;
                self.bdiag[bmin - 1] = Lin::MAX;
            } else {
                bmin += 1;
            }
            if bmax < dmax {
                bmax += 1;
                self.bdiag[bmax + 1] = Lin::MAX;
            } else {
                bmax -= 1;
            }

            let mut d = bmax;
            while d >= bmin {
                let tlo = self.bdiag[d - 1];
                let thi = self.bdiag[d + 1];
                let x0 = if tlo < thi { tlo } else { thi - 1 };
                let (mut x, mut y) = (x0, x0 - d);

                while xoff < x && yoff < y && self.equal(x - 1, y - 1) {
                    x -= 1;
                    y -= 1;
                }
                if x0 - x > SNAKE_LIMIT {
                    big_snake = true;
                }
                self.bdiag[d] = x;

                if !odd && fmin <= d && d <= fmax && x <= self.fdiag[d] {
                    return Partition {
                        xmid: x,
                        ymid: y,
                        lo_minimal: true,
                        hi_minimal: true,
                    };
                }
                d -= 2;
            }

            if !find_minimal {
                if c > 200 && big_snake && self.heuristic {
                    if let Some(part) = self.big_snake_split(c, (fmin, fmax, fmid), (bmin, bmax, bmid), (xoff, xlim, yoff, ylim)) {
                        return part;
                    }
                }

                if c >= self.too_expensive {
                    return self.best_effort_split((fmin, fmax), (bmin, bmax), (xoff, xlim, yoff, ylim));
                }
            }

            c += 1;
        }
    }

    /// Pick the diagonal that has made the most progress relative to its
    /// cost, provided it ends in a snake of at least [`SNAKE_LIMIT`] lines.
    fn big_snake_split(
        &self,
        c: Lin,
        (fmin, fmax, fmid): (Lin, Lin, Lin),
        (bmin, bmax, bmid): (Lin, Lin, Lin),
        (xoff, xlim, yoff, ylim): (Lin, Lin, Lin, Lin),
    ) -> Option<Partition> {
        let mut best = 0;
        let mut found = None;
        let mut d = fmax;
        while d >= fmin {
            let dd = d - fmid;
            let x = self.fdiag[d];
            let y = x - d;
            let v = (x - xoff) * 2 - dd;

            if v > 12 * (c + dd.abs())
                && v > best
                && xoff + SNAKE_LIMIT <= x
                && x < xlim
                && yoff + SNAKE_LIMIT <= y
                && y < ylim
                && (1..=SNAKE_LIMIT).all(|k| self.equal(x - k, y - k))
            {
                best = v;
                found = Some((x, y));
            }
            d -= 2;
        }
        if let Some((xmid, ymid)) = found {
            return Some(Partition {
                xmid,
                ymid,
                lo_minimal: true,
                hi_minimal: false,
            });
        }

        let mut best = 0;
        let mut d = bmax;
        while d >= bmin {
            let dd = d - bmid;
            let x = self.bdiag[d];
            let y = x - d;
            let v = (xlim - x) * 2 + dd;

            if v > 12 * (c + dd.abs())
                && v > best
                && xoff < x
                && x <= xlim - SNAKE_LIMIT
                && yoff < y
                && y <= ylim - SNAKE_LIMIT
                && (0..SNAKE_LIMIT).all(|k| self.equal(x + k, y + k))
            {
                best = v;
                found = Some((x, y));
            }
            d -= 2;
        }
        found.map(|(xmid, ymid)| Partition {
            xmid,
            ymid,
            lo_minimal: false,
            hi_minimal: true,
        })
    }

    /// Give up on minimality: split at whichever of the furthest forward or
    /// backward reaching points has covered more of the region.
    fn best_effort_split(
        &self,
        (fmin, fmax): (Lin, Lin),
        (bmin, bmax): (Lin, Lin),
        (xoff, xlim, yoff, ylim): (Lin, Lin, Lin, Lin),
    ) -> Partition {
        let (mut fxybest, mut fxbest) = (-1, 0);
        let mut d = fmax;
        while d >= fmin {
            let mut x = self.fdiag[d].min(xlim);
            let mut y = x - d;
            if ylim < y {
                x = ylim + d;
                y = ylim;
            }
            if fxybest < x + y {
                fxybest = x + y;
                fxbest = x;
            }
            d -= 2;
        }

        let (mut bxybest, mut bxbest) = (Lin::MAX, 0);
        let mut d = bmax;
        while d >= bmin {
            let mut x = self.bdiag[d].max(xoff);
            let mut y = x - d;
            if y < yoff {
                x = yoff + d;
                y = yoff;
            }
            if x + y < bxybest {
                bxybest = x + y;
                bxbest = x;
            }
            d -= 2;
        }

        if (xlim + ylim) - bxybest < fxybest - (xoff + yoff) {
            Partition {
                xmid: fxbest,
                ymid: fxybest - fxbest,
                lo_minimal: true,
                hi_minimal: false,
            }
        } else {
            Partition {
                xmid: bxbest,
                ymid: bxybest - bxbest,
                lo_minimal: false,
                hi_minimal: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::diff::change::{ChangeFlags, EditScript};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    struct Flags([ChangeFlags; 2]);

    impl EditSink for Flags {
        fn note_delete(&mut self, x: Lin) {
            self.0[0][x] = true;
        }

        fn note_insert(&mut self, y: Lin) {
            self.0[1][y] = true;
        }
    }

    fn run(xv: &[Lin], yv: &[Lin], minimal: bool) -> EditScript {
        let mut sink = Flags([
            ChangeFlags::new(xv.len() as Lin).unwrap(),
            ChangeFlags::new(yv.len() as Lin).unwrap(),
        ]);
        LcsEngine::new(xv, yv, false).unwrap().compare(minimal, &mut sink);
        EditScript::from_flags(&sink.0[0], &sink.0[1])
    }

    fn cost(script: &EditScript) -> Lin {
        script.iter().map(|c| c.deleted + c.inserted).sum()
    }

    /// Edit distance by dynamic programming, for checking minimality.
    fn reference_cost(xv: &[Lin], yv: &[Lin]) -> Lin {
        let mut lcs = vec![vec![0 as Lin; yv.len() + 1]; xv.len() + 1];
        for i in (0..xv.len()).rev() {
            for j in (0..yv.len()).rev() {
                lcs[i][j] = if xv[i] == yv[j] {
                    lcs[i + 1][j + 1] + 1
                } else {
                    lcs[i + 1][j].max(lcs[i][j + 1])
                };
            }
        }
        (xv.len() + yv.len()) as Lin - 2 * lcs[0][0]
    }

    #[test]
    fn single_replacement() {
        let script = run(&[1, 2, 3], &[1, 4, 3], false);

        assert_eq!(script.len(), 1);
        let change = script.changes()[0];
        assert_eq!((change.line0, change.line1, change.deleted, change.inserted), (1, 1, 1, 1));
    }

    #[rstest]
    #[case(&[], &[1, 2], 2)]
    #[case(&[1, 2], &[], 2)]
    #[case(&[1, 2, 3], &[1, 2, 3], 0)]
    #[case(&[1, 2, 3, 1, 2, 2, 1], &[3, 2, 1, 2, 1, 3], 5)]
    fn minimal_cost(#[case] xv: &[Lin], #[case] yv: &[Lin], #[case] expected: Lin) {
        assert_eq!(cost(&run(xv, yv, true)), expected);
    }

    #[test]
    fn cheap_split_still_reproduces_b() {
        let xv: Vec<Lin> = (0..400).map(|i| i % 7).collect();
        let yv: Vec<Lin> = (0..400).map(|i| (i * 3) % 11).collect();
        let mut sink = Flags([ChangeFlags::new(400).unwrap(), ChangeFlags::new(400).unwrap()]);

        LcsEngine::new(&xv, &yv, true)
            .unwrap()
            .with_too_expensive(4)
            .compare(false, &mut sink);
        let script = EditScript::from_flags(&sink.0[0], &sink.0[1]);

        assert_eq!(script.apply(&xv, &yv), yv);
    }

    proptest! {
        #[test]
        fn script_turns_a_into_b(
            xv in prop::collection::vec(1..6 as Lin, 0..40),
            yv in prop::collection::vec(1..6 as Lin, 0..40),
        ) {
            let script = run(&xv, &yv, false);
            prop_assert_eq!(script.apply(&xv, &yv), yv);
        }

        #[test]
        fn minimal_search_is_optimal(
            xv in prop::collection::vec(1..5 as Lin, 0..25),
            yv in prop::collection::vec(1..5 as Lin, 0..25),
        ) {
            prop_assert_eq!(cost(&run(&xv, &yv, true)), reference_cost(&xv, &yv));
        }

        #[test]
        fn search_is_deterministic(
            xv in prop::collection::vec(1..4 as Lin, 0..30),
            yv in prop::collection::vec(1..4 as Lin, 0..30),
        ) {
            prop_assert_eq!(run(&xv, &yv, false), run(&xv, &yv, false));
        }

        #[test]
        fn self_comparison_is_empty(xv in prop::collection::vec(1..6 as Lin, 0..40)) {
            prop_assert!(run(&xv, &xv, false).is_empty());
        }
    }
}
