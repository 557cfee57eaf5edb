use super::line_output::LineFlag;
use super::{Renderer, number_range};
use crate::artifacts::diff::change::{Change, EditScript};
use crate::artifacts::diff::triviality::Changes;
use std::io;

impl Renderer<'_> {
    /// Commands run from the end of the file towards its start, so earlier
    /// commands never shift the line numbers of later ones.
    pub(super) fn print_ed_script(&self, script: &EditScript) -> io::Result<()> {
        let hunks: Vec<&[Change]> = self.hunks(script).collect();
        for hunk in hunks.into_iter().rev() {
            self.print_ed_hunk(hunk)?;
        }

        Ok(())
    }

    fn print_ed_hunk(&self, hunk: &[Change]) -> io::Result<()> {
        let bounds = self.filter.analyze(hunk);
        if bounds.changes.is_empty() {
            return Ok(());
        }

        self.begin_output()?;

        let header = format!(
            "{}{}\n",
            number_range(self.tables[0], bounds.first0, bounds.last0, ','),
            bounds.changes.letter()
        );
        self.write_bytes(header.as_bytes())?;

        if bounds.changes == Changes::OLD {
            return Ok(());
        }

        let mut insert_mode = true;
        for i in bounds.first1..=bounds.last1 {
            if !insert_mode {
                self.write_bytes(b"a\n")?;
                insert_mode = true;
            }

            // A lone "." would end the insertion; write ".." and strip
            // the extra dot with a substitution.
            if self.tables[1].line(i) == b".\n" {
                self.write_bytes(b"..\n.\ns/.//\n")?;
                insert_mode = false;
            } else {
                self.print_line(LineFlag::Bare, 1, i, None)?;
            }
        }

        if insert_mode {
            self.write_bytes(b".\n")?;
        }

        Ok(())
    }

    pub(super) fn print_forward_ed_script(&self, script: &EditScript) -> io::Result<()> {
        for hunk in self.hunks(script) {
            let bounds = self.filter.analyze(hunk);
            if bounds.changes.is_empty() {
                continue;
            }

            self.begin_output()?;

            let header = format!(
                "{}{}\n",
                bounds.changes.letter(),
                number_range(self.tables[0], bounds.first0, bounds.last0, ' ')
            );
            self.write_bytes(header.as_bytes())?;

            if bounds.changes == Changes::OLD {
                continue;
            }

            for i in bounds.first1..=bounds.last1 {
                self.print_line(LineFlag::Bare, 1, i, None)?;
            }
            self.write_bytes(b".\n")?;
        }

        Ok(())
    }

    /// RCS scripts: `dL N` deletes N lines at L, `aL N` appends the N lines
    /// that follow after line L.
    pub(super) fn print_rcs_script(&self, script: &EditScript) -> io::Result<()> {
        for hunk in self.hunks(script) {
            let bounds = self.filter.analyze(hunk);
            if bounds.changes.is_empty() {
                continue;
            }

            self.begin_output()?;

            let [a, b] = self.tables;
            let (tf0, tl0) = (a.translate(bounds.first0), a.translate(bounds.last0));
            let count = |first, last| if first <= last { last - first + 1 } else { 1 };

            if bounds.changes.contains(Changes::OLD) {
                self.write_bytes(format!("d{tf0} {}\n", count(tf0, tl0)).as_bytes())?;
            }

            if bounds.changes.contains(Changes::NEW) {
                let (tf1, tl1) = (b.translate(bounds.first1), b.translate(bounds.last1));
                self.write_bytes(format!("a{tl0} {}\n", count(tf1, tl1)).as_bytes())?;

                for i in bounds.first1..=bounds.last1 {
                    self.print_line(LineFlag::Bare, 1, i, None)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::OutputStyle;
    use crate::artifacts::format::tests::render;
    use crate::artifacts::options::DiffOptions;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn style(output_style: OutputStyle) -> DiffOptions {
        DiffOptions {
            output_style,
            ..DiffOptions::default()
        }
    }

    #[test]
    fn ed_script_runs_backwards() {
        let output = render("1\n2\n3\n4\n5\n", "1\nx\n3\n5\n", style(OutputStyle::Ed));

        assert_eq!(output, "4d\n2c\nx\n.\n");
    }

    #[rstest]
    #[case("a\n", "a\nb\n", "1a\nb\n.\n")]
    #[case("a\nb\n", "a\n", "2d\n")]
    #[case("a\nb\nc\n", "a\nx\ny\nc\n", "2c\nx\ny\n.\n")]
    fn ed_commands(#[case] a: &str, #[case] b: &str, #[case] expected: &str) {
        assert_eq!(render(a, b, style(OutputStyle::Ed)), expected);
    }

    #[test]
    fn lone_dots_are_escaped() {
        let output = render("a\n", "a\n.\nb\n", style(OutputStyle::Ed));

        assert_eq!(output, "1a\n..\n.\ns/.//\na\nb\n.\n");
    }

    #[test]
    fn forward_ed_runs_forwards() {
        let output = render("1\n2\n3\n4\n5\n", "1\nx\n3\n5\n", style(OutputStyle::ForwardEd));

        assert_eq!(output, "c2\nx\n.\nd4\n");
    }

    #[test]
    fn forward_ed_ranges_use_spaces() {
        let output = render("1\n2\n3\n", "1\n", style(OutputStyle::ForwardEd));

        assert_eq!(output, "d2 3\n");
    }

    #[rstest]
    #[case("1\n2\n3\n4\n5\n", "1\nx\n3\n5\n", "d2 1\na2 1\nx\nd4 1\n")]
    #[case("a\n", "a\nb\nc\n", "a1 2\nb\nc\n")]
    #[case("a\nb\nc\n", "c\n", "d1 2\n")]
    fn rcs_commands(#[case] a: &str, #[case] b: &str, #[case] expected: &str) {
        assert_eq!(render(a, b, style(OutputStyle::Rcs)), expected);
    }
}
