use crate::areas::session::Session;
use crate::areas::workspace::EntryKind;
use crate::artifacts::diff::verdict::Verdict;
use crate::commands::report_trouble;
use std::cmp::Ordering;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

/// Which side of a directory pair an entry was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Left,
    Right,
    Both,
}

/// Merge two sorted name lists into one, remembering where each name
/// came from.
fn pair_entries(left: Vec<OsString>, right: Vec<OsString>) -> Vec<(OsString, Presence)> {
    let mut paired = Vec::with_capacity(left.len().max(right.len()));
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let order = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.cmp(r),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };

        match order {
            Ordering::Less => paired.extend(left.next().map(|name| (name, Presence::Left))),
            Ordering::Greater => paired.extend(right.next().map(|name| (name, Presence::Right))),
            Ordering::Equal => {
                right.next();
                paired.extend(left.next().map(|name| (name, Presence::Both)));
            }
        }
    }

    paired
}

impl Session {
    /// Compare two directories entry by entry.
    ///
    /// Problems with one entry are reported and turn into a `Trouble`
    /// verdict without stopping the comparison of the others.
    pub fn compare_directories(&self, a: &Path, b: &Path) -> anyhow::Result<Verdict> {
        let entries = pair_entries(self.list_entries(a)?, self.list_entries(b)?);
        tracing::debug!(a = %a.display(), b = %b.display(), entries = entries.len(), "comparing directories");

        let mut verdict = Verdict::Identical;
        for (name, presence) in entries {
            let (path_a, path_b) = (a.join(&name), b.join(&name));

            let outcome = match presence {
                Presence::Left if !self.options().new_file => self.report_only_in(a, &name),
                Presence::Right if !self.options().new_file => self.report_only_in(b, &name),
                _ => self.compare_entry(&path_a, &path_b),
            };

            verdict = verdict.merge(outcome.unwrap_or_else(|err| {
                report_trouble(&err);
                Verdict::Trouble
            }));
        }

        Ok(verdict)
    }

    /// A directory that does not exist lists as empty, so a whole subtree
    /// present on one side only can be compared under `--new-file`.
    fn list_entries(&self, dir: &Path) -> anyhow::Result<Vec<OsString>> {
        if self.options().new_file && self.workspace().entry_kind(dir)?.is_none() {
            return Ok(Vec::new());
        }

        Ok(self.workspace().list_dir(dir)?)
    }

    fn report_only_in(&self, dir: &Path, name: &OsString) -> anyhow::Result<Verdict> {
        writeln!(
            self.writer(),
            "Only in {}: {}",
            dir.display(),
            name.to_string_lossy()
        )?;

        Ok(Verdict::Different)
    }

    fn compare_entry(&self, a: &Path, b: &Path) -> anyhow::Result<Verdict> {
        let kinds = [self.workspace().entry_kind(a)?, self.workspace().entry_kind(b)?];

        match kinds {
            [Some(EntryKind::Directory), Some(EntryKind::Directory)] if self.options().recursive => {
                self.compare_directories(a, b)
            }
            [Some(EntryKind::Directory), Some(EntryKind::Directory)] => {
                writeln!(
                    self.writer(),
                    "Common subdirectories: {} and {}",
                    a.display(),
                    b.display()
                )?;
                Ok(Verdict::Identical)
            }
            [Some(kind_a), Some(kind_b)] if kind_a != kind_b => {
                writeln!(
                    self.writer(),
                    "File {} is a {} while file {} is a {}",
                    a.display(),
                    kind_a.describe(),
                    b.display(),
                    kind_b.describe()
                )?;
                Ok(Verdict::Different)
            }
            [Some(EntryKind::Directory), None] | [None, Some(EntryKind::Directory)] => {
                if self.options().recursive {
                    self.compare_directories(a, b)
                } else if kinds[0].is_some() {
                    self.report_only_in_parent(a)
                } else {
                    self.report_only_in_parent(b)
                }
            }
            _ => self.compare_files(a, b, Some(self.banner_for(a, b))),
        }
    }

    fn report_only_in_parent(&self, path: &Path) -> anyhow::Result<Verdict> {
        let parent = path.parent().unwrap_or(Path::new("."));
        let name = path.file_name().map(OsString::from).unwrap_or_default();

        self.report_only_in(parent, &name)
    }
}
