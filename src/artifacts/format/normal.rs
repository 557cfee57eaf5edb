use super::line_output::LineFlag;
use super::{Renderer, number_range};
use crate::artifacts::color::ColorContext;
use crate::artifacts::diff::change::{Change, EditScript};
use crate::artifacts::diff::triviality::Changes;
use std::io;

impl Renderer<'_> {
    pub(super) fn print_normal_script(&self, script: &EditScript) -> io::Result<()> {
        for hunk in self.hunks(script) {
            self.print_normal_hunk(hunk)?;
        }

        Ok(())
    }

    fn print_normal_hunk(&self, hunk: &[Change]) -> io::Result<()> {
        let bounds = self.filter.analyze(hunk);
        if bounds.changes.is_empty() {
            return Ok(());
        }

        self.begin_output()?;

        self.session.set_color_context(ColorContext::LineNumber)?;
        let header = format!(
            "{}{}{}",
            number_range(self.tables[0], bounds.first0, bounds.last0, ','),
            bounds.changes.letter(),
            number_range(self.tables[1], bounds.first1, bounds.last1, ','),
        );
        self.write_bytes(header.as_bytes())?;
        self.session.set_color_context(ColorContext::Reset)?;
        self.write_bytes(b"\n")?;

        if bounds.changes.contains(Changes::OLD) {
            for i in bounds.first0..=bounds.last0 {
                self.print_line(LineFlag::Spaced("<"), 0, i, Some(ColorContext::Delete))?;
            }
        }

        if bounds.changes == Changes::CHANGED {
            self.write_bytes(b"---\n")?;
        }

        if bounds.changes.contains(Changes::NEW) {
            for i in bounds.first1..=bounds.last1 {
                self.print_line(LineFlag::Spaced(">"), 1, i, Some(ColorContext::Add))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::artifacts::format::tests::render;
    use crate::artifacts::options::DiffOptions;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("a\nb\nc\n", "a\nx\nc\n", "2c2\n< b\n---\n> x\n")]
    #[case("a\nb\nc\n", "a\nc\n", "2d1\n< b\n")]
    #[case("a\nc\n", "a\nb\nc\n", "1a2\n> b\n")]
    #[case("a\nb\nc\nd\n", "a\nd\n", "2,3d1\n< b\n< c\n")]
    #[case("", "a\nb\n", "0a1,2\n> a\n> b\n")]
    #[case("a\n", "a\n", "")]
    fn normal_output(#[case] a: &str, #[case] b: &str, #[case] expected: &str) {
        assert_eq!(render(a, b, DiffOptions::default()), expected);
    }

    #[test]
    fn separated_changes_get_separate_hunks() {
        let output = render("1\n2\n3\n4\n5\n", "1\nx\n3\ny\n5\n", DiffOptions::default());

        assert_eq!(output, "2c2\n< 2\n---\n> x\n4c4\n< 4\n---\n> y\n");
    }

    #[test]
    fn ignored_blank_lines_leave_the_rest() {
        let options = DiffOptions {
            ignore_blank_lines: true,
            ..DiffOptions::default()
        };

        let output = render("a\n\nb\nc\n", "a\nb\nd\n", options);

        assert_eq!(output, "4c3\n< c\n---\n> d\n");
    }
}
