use crate::Lin;
use crate::artifacts::core::error::{DiffError, reserve};
use derive_new::new;
use std::ops::{Index, IndexMut};

/// One run of the edit script: `deleted` lines of A starting at `line0` are
/// replaced by `inserted` lines of B starting at `line1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Change {
    pub line0: Lin,
    pub line1: Lin,
    pub deleted: Lin,
    pub inserted: Lin,
    /// Every line of the change is trivial (blank or matched by `-I`).
    #[new(default)]
    pub ignore: bool,
}

impl Change {
    /// First line of A after this change.
    pub fn end0(&self) -> Lin {
        self.line0 + self.deleted
    }

    /// First line of B after this change.
    pub fn end1(&self) -> Lin {
        self.line1 + self.inserted
    }
}

/// Per-line "changed" marks for one input, with a `false` sentinel on each
/// side so that scans may step one position past either end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFlags {
    flags: Vec<bool>,
}

impl ChangeFlags {
    pub fn new(len: Lin) -> Result<Self, DiffError> {
        let size = (len as usize)
            .checked_add(2)
            .ok_or(DiffError::OutOfMemory { what: "change flags" })?;
        let mut flags = Vec::new();
        reserve(&mut flags, size, "change flags")?;
        flags.resize(size, false);
        Ok(ChangeFlags { flags })
    }

    pub fn len(&self) -> Lin {
        (self.flags.len() - 2) as Lin
    }

    pub fn is_empty(&self) -> bool {
        self.flags.len() == 2
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

impl Index<Lin> for ChangeFlags {
    type Output = bool;

    fn index(&self, i: Lin) -> &bool {
        &self.flags[(i + 1) as usize]
    }
}

impl IndexMut<Lin> for ChangeFlags {
    fn index_mut(&mut self, i: Lin) -> &mut bool {
        &mut self.flags[(i + 1) as usize]
    }
}

/// The ordered list of changes turning A into B.
///
/// Changes are non-overlapping and strictly ascending in both `line0` and
/// `line1`, and always separated by at least one unchanged line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    changes: Vec<Change>,
}

impl EditScript {
    pub fn new(changes: Vec<Change>) -> Self {
        EditScript { changes }
    }

    /// Compress per-line change marks into runs.
    pub fn from_flags(changed0: &ChangeFlags, changed1: &ChangeFlags) -> Self {
        let (len0, len1) = (changed0.len(), changed1.len());
        let mut changes = Vec::new();
        let (mut i0, mut i1) = (0, 0);

        while i0 < len0 || i1 < len1 {
            if changed0[i0] || changed1[i1] {
                let (line0, line1) = (i0, i1);

                while changed0[i0] {
                    i0 += 1;
                }
                while changed1[i1] {
                    i1 += 1;
                }

                changes.push(Change::new(line0, line1, i0 - line0, i1 - line1));
            }

            // Both sides are now on an unchanged line.
            i0 += 1;
            i1 += 1;
        }

        EditScript { changes }
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn changes_mut(&mut self) -> &mut [Change] {
        &mut self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Shift every change by `delta0` lines in A and `delta1` lines in B.
    pub fn offset(mut self, delta0: Lin, delta1: Lin) -> Self {
        for change in &mut self.changes {
            change.line0 += delta0;
            change.line1 += delta1;
        }
        self
    }

    /// Order the changes last-to-first, as ed scripts need.
    pub fn reversed(&self) -> Self {
        EditScript {
            changes: self.changes.iter().rev().copied().collect(),
        }
    }

    /// Apply the script to `a`, taking inserted lines from `b`.
    pub fn apply<T: Clone>(&self, a: &[T], b: &[T]) -> Vec<T> {
        let mut out = Vec::with_capacity(b.len());
        let mut next0 = 0usize;

        for change in &self.changes {
            out.extend_from_slice(&a[next0..change.line0 as usize]);
            out.extend_from_slice(&b[change.line1 as usize..change.end1() as usize]);
            next0 = change.end0() as usize;
        }
        out.extend_from_slice(&a[next0..]);
        out
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
