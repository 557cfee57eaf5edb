use crate::OutputStyle;
use crate::areas::session::Session;
use crate::areas::workspace::{EntryKind, Source, Workspace};
use crate::artifacts::core::error::DiffError;
use crate::artifacts::diff::analysis::diff_tables;
use crate::artifacts::diff::triviality::TrivialityFilter;
use crate::artifacts::diff::verdict::Verdict;
use crate::artifacts::format::header::{banner, file_label};
use crate::artifacts::format::{Preamble, Renderer};
use crate::artifacts::lines::line_table::{LineTable, is_binary};
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};

impl Session {
    /// Compare the two operands given on the command line.
    ///
    /// Two directories are compared entry by entry. A directory and a file
    /// compare the file with the same-named file inside the directory.
    pub fn compare_paths(&self, a: &Path, b: &Path) -> anyhow::Result<Verdict> {
        let kinds = [self.operand_kind(a)?, self.operand_kind(b)?];
        tracing::debug!(a = %a.display(), b = %b.display(), ?kinds, "comparing operands");

        match kinds {
            [Some(EntryKind::Directory), Some(EntryKind::Directory)] => self.compare_directories(a, b),
            [Some(EntryKind::Directory), _] => {
                let a = Self::inside_directory(a, b)?;
                self.compare_files(&a, b, None)
            }
            [_, Some(EntryKind::Directory)] => {
                let b = Self::inside_directory(b, a)?;
                self.compare_files(a, &b, None)
            }
            _ => self.compare_files(a, b, None),
        }
    }

    /// `None` only when the operand is missing and `--new-file` lets it
    /// stand for an empty file.
    fn operand_kind(&self, path: &Path) -> anyhow::Result<Option<EntryKind>> {
        match self.workspace().entry_kind(path)? {
            None if !self.options().new_file => {
                let err = std::fs::metadata(path)
                    .err()
                    .unwrap_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound));
                Err(DiffError::io(path, err).into())
            }
            kind => Ok(kind),
        }
    }

    fn inside_directory(dir: &Path, file: &Path) -> anyhow::Result<PathBuf> {
        if Workspace::is_stdin(file) {
            anyhow::bail!("cannot compare '-' to a directory");
        }

        let name = file
            .file_name()
            .with_context(|| format!("{}: not a file name", file.display()))?;
        Ok(dir.join(name))
    }

    fn load(&self, path: &Path) -> anyhow::Result<Source> {
        if self.options().new_file && self.workspace().entry_kind(path)?.is_none() {
            return Ok(Source::missing(path.to_string_lossy()));
        }

        Ok(self.workspace().read_source(path)?)
    }

    /// Compare two files, printing the differences in the session's style.
    ///
    /// `banner` introduces the output when the pair is part of a directory
    /// comparison.
    pub fn compare_files(&self, a: &Path, b: &Path, banner_line: Option<String>) -> anyhow::Result<Verdict> {
        let sources = [self.load(a)?, self.load(b)?];
        self.compare_sources(&sources, banner_line)
    }

    pub fn compare_sources(&self, sources: &[Source; 2], banner_line: Option<String>) -> anyhow::Result<Verdict> {
        let options = self.options();
        let [a, b] = sources;
        let always_render = options.output_style == OutputStyle::SideBySide && !options.suppress_common_lines;

        if a.data == b.data && !always_render {
            return self.report_identical(sources);
        }

        if !options.text && (is_binary(&a.data) || is_binary(&b.data)) {
            if a.data == b.data {
                return self.report_identical(sources);
            }
            let message = if options.brief { "Files" } else { "Binary files" };
            writeln!(self.writer(), "{message} {} and {} differ", a.name, b.name)?;
            return Ok(Verdict::Different);
        }

        let mut tables = [
            LineTable::new(a.data.clone(), options.strip_trailing_cr)?,
            LineTable::new(b.data.clone(), options.strip_trailing_cr)?,
        ];
        if !options.output_style.is_robust() {
            self.supply_final_newlines(&mut tables, sources);
        }
        let [table_a, table_b] = &tables;

        let mut script = diff_tables([table_a, table_b], options)?;
        let verdict = if TrivialityFilter::new([table_a, table_b], options).has_real_changes(&script) {
            Verdict::Different
        } else {
            Verdict::Identical
        };
        tracing::debug!(a = %a.name, b = %b.name, ?verdict, changes = script.len(), "compared files");

        if options.brief {
            if verdict == Verdict::Different {
                writeln!(self.writer(), "Files {} and {} differ", a.name, b.name)?;
            }
            return Ok(verdict);
        }

        if verdict == Verdict::Different || always_render {
            let preamble = Preamble {
                banner: banner_line,
                labels: [0, 1].map(|k| {
                    file_label(&sources[k], options.output_style, options.labels[k].as_deref())
                }),
            };
            Renderer::new(self, [table_a, table_b], &preamble).render(&mut script)?;
        }

        if verdict == Verdict::Identical {
            return self.report_identical(sources);
        }

        Ok(verdict)
    }

    /// Ed scripts cannot express an incomplete last line, so the missing
    /// newline is added and the edit is logged. Returns the affected names.
    fn supply_final_newlines<'s>(&self, tables: &mut [LineTable; 2], sources: &'s [Source; 2]) -> Vec<&'s str> {
        let style = self.options().output_style;
        tables
            .iter_mut()
            .zip(sources)
            .filter_map(|(table, source)| {
                if !table.ensure_final_newline() {
                    return None;
                }
                tracing::warn!(file = %source.name, ?style, "no newline at end of file; supplying one");
                Some(source.name.as_str())
            })
            .collect()
    }

    fn report_identical(&self, [a, b]: &[Source; 2]) -> anyhow::Result<Verdict> {
        if self.options().report_identical_files {
            writeln!(self.writer(), "Files {} and {} are identical", a.name, b.name)?;
        }

        Ok(Verdict::Identical)
    }

    /// The `diff SWITCHES A B` line for a pair inside a directory run.
    pub(crate) fn banner_for(&self, a: &Path, b: &Path) -> String {
        banner(
            &self.options().switch_string,
            [&a.to_string_lossy(), &b.to_string_lossy()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::options::DiffOptions;
    use crate::testing::SharedBuffer;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::time::SystemTime;

    fn source(name: &str, data: &[u8]) -> Source {
        Source {
            name: name.to_string(),
            data: data.to_vec(),
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    fn run(options: DiffOptions, a: &[u8], b: &[u8]) -> (Verdict, String) {
        let buffer = SharedBuffer::default();
        let session = Session::new(options, Box::new(buffer.clone()));

        let verdict = session
            .compare_sources(&[source("a", a), source("b", b)], None)
            .unwrap();

        (verdict, buffer.contents())
    }

    #[fixture]
    fn options() -> DiffOptions {
        DiffOptions::default()
    }

    #[rstest]
    fn identical_inputs(options: DiffOptions) {
        assert_eq!(run(options, b"x\n", b"x\n"), (Verdict::Identical, String::new()));
    }

    #[rstest]
    fn different_inputs(options: DiffOptions) {
        assert_eq!(
            run(options, b"x\n", b"y\n"),
            (Verdict::Different, "1c1\n< x\n---\n> y\n".to_string())
        );
    }

    #[rstest]
    fn binary_inputs_are_not_diffed(options: DiffOptions) {
        assert_eq!(
            run(options, b"x\0\n", b"y\0\n"),
            (Verdict::Different, "Binary files a and b differ\n".to_string())
        );
    }

    #[test]
    fn text_mode_diffs_binary_inputs() {
        let options = DiffOptions {
            text: true,
            ..DiffOptions::default()
        };

        assert_eq!(
            run(options, b"x\0\n", b"y\0\n"),
            (Verdict::Different, "1c1\n< x\0\n---\n> y\0\n".to_string())
        );
    }

    #[test]
    fn brief_reports_only_whether_files_differ() {
        let options = DiffOptions {
            brief: true,
            ..DiffOptions::default()
        };

        assert_eq!(
            run(options, b"x\n", b"y\n"),
            (Verdict::Different, "Files a and b differ\n".to_string())
        );
    }

    #[test]
    fn identical_files_can_be_reported() {
        let options = DiffOptions {
            report_identical_files: true,
            ignore_case: true,
            ..DiffOptions::default()
        };

        assert_eq!(
            run(options, b"Funky Stuff\n", b"fUNKy stuFf\n"),
            (Verdict::Identical, "Files a and b are identical\n".to_string())
        );
    }

    #[test]
    fn blank_line_changes_alone_leave_files_identical() {
        let options = DiffOptions {
            ignore_blank_lines: true,
            ..DiffOptions::default()
        };

        assert_eq!(run(options, b"a\n\nb\n", b"a\nb\n"), (Verdict::Identical, String::new()));
    }

    #[test]
    fn side_by_side_shows_identical_files() {
        let options = DiffOptions {
            output_style: OutputStyle::SideBySide,
            width: 20,
            expand_tabs: true,
            ..DiffOptions::default()
        };

        assert_eq!(
            run(options, b"x\n", b"x\n"),
            (Verdict::Identical, format!("x{}x\n", " ".repeat(11)))
        );
    }

    #[test]
    fn ed_scripts_complete_the_last_line() {
        let options = DiffOptions {
            output_style: OutputStyle::Ed,
            ..DiffOptions::default()
        };

        assert_eq!(
            run(options, b"a\n", b"b"),
            (Verdict::Different, "1c\nb\n.\n".to_string())
        );
    }

    #[rstest]
    #[case::first(b"a", b"b\n", vec!["a"])]
    #[case::second(b"a\n", b"b", vec!["b"])]
    #[case::both(b"a", b"b", vec!["a", "b"])]
    #[case::neither(b"a\n", b"b\n", vec![])]
    fn supplied_newlines_name_their_files(
        #[case] a: &[u8],
        #[case] b: &[u8],
        #[case] expected: Vec<&str>,
    ) {
        let session = Session::new(DiffOptions::default(), Box::new(SharedBuffer::default()));
        let sources = [source("a", a), source("b", b)];
        let mut tables = [
            LineTable::new(a.to_vec(), false).unwrap(),
            LineTable::new(b.to_vec(), false).unwrap(),
        ];

        assert_eq!(session.supply_final_newlines(&mut tables, &sources), expected);
        assert!(tables.iter().all(|table| !table.missing_newline()));
    }
}
