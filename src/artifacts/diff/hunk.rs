use crate::artifacts::diff::change::{Change, EditScript};
use crate::artifacts::options::DiffOptions;
use crate::{Lin, OutputStyle};
use derive_new::new;

/// How far apart two changes may be and still share a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct HunkPolicy {
    context: Lin,
}

impl HunkPolicy {
    /// Context styles merge changes whose context would overlap; every other
    /// style prints each change on its own.
    pub fn for_options(options: &DiffOptions) -> Self {
        match options.output_style {
            OutputStyle::Context | OutputStyle::Unified => HunkPolicy::new(options.context),
            _ => HunkPolicy::new(0),
        }
    }

    /// A following change joins the hunk when fewer than this many
    /// unchanged lines separate them.
    fn threshold(&self, next: &Change) -> Lin {
        if next.ignore {
            self.context
        } else {
            2 * self.context + 1
        }
    }
}

/// Splits an edit script into hunks, each a contiguous slice of changes.
#[derive(Debug, Clone)]
pub struct Hunks<'s> {
    rest: &'s [Change],
    policy: HunkPolicy,
}

impl<'s> Hunks<'s> {
    pub fn new(script: &'s EditScript, policy: HunkPolicy) -> Self {
        Hunks {
            rest: script.changes(),
            policy,
        }
    }
}

impl<'s> Iterator for Hunks<'s> {
    type Item = &'s [Change];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let mut end = 1;
        while let Some(next) = self.rest.get(end) {
            let prev = &self.rest[end - 1];
            let gap = next.line0 - prev.end0();
            debug_assert_eq!(gap, next.line1 - prev.end1());

            if gap >= self.policy.threshold(next) {
                break;
            }
            end += 1;
        }

        let (hunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(hunk)
    }
}
