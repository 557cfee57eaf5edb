use super::line_output::LineFlag;
use super::{Renderer, number_range};
use crate::Lin;
use crate::artifacts::color::ColorContext;
use crate::artifacts::diff::change::{Change, EditScript};
use crate::artifacts::diff::triviality::{Changes, HunkBounds};
use crate::artifacts::lines::line_table::LineTable;
use std::io;

/// `first,count` as unified headers write it: a lone line is just its
/// number, an empty range names the line before it with a zero count.
fn unified_range(table: &LineTable, a: Lin, b: Lin) -> String {
    let (ta, tb) = (table.translate(a), table.translate(b));
    if tb < ta {
        format!("{tb},0")
    } else if tb == ta {
        tb.to_string()
    } else {
        format!("{ta},{}", tb - ta + 1)
    }
}

impl Renderer<'_> {
    pub(super) fn print_context_script(&self, script: &EditScript) -> io::Result<()> {
        for hunk in self.hunks(script) {
            self.print_context_hunk(hunk)?;
        }

        Ok(())
    }

    pub(super) fn print_unified_script(&self, script: &EditScript) -> io::Result<()> {
        for hunk in self.hunks(script) {
            self.print_unified_hunk(hunk)?;
        }

        Ok(())
    }

    /// Bounds of `hunk` widened by the context size, or `None` when the hunk
    /// is trivial.
    fn context_bounds(&self, hunk: &[Change]) -> Option<HunkBounds> {
        let mut bounds = self.filter.analyze(hunk);
        if bounds.changes.is_empty() {
            return None;
        }

        let context = self.options().context;
        let [a, b] = self.tables;
        bounds.first0 = (bounds.first0 - context).max(0);
        bounds.first1 = (bounds.first1 - context).max(0);
        bounds.last0 = (bounds.last0 + context).min(a.len() - 1);
        bounds.last1 = (bounds.last1 + context).min(b.len() - 1);

        Some(bounds)
    }

    fn print_caption(&self, first0: Lin) -> io::Result<()> {
        if let Some(caption) = self.functions.caption(first0) {
            self.write_bytes(b" ")?;
            self.write_bytes(caption)?;
        }

        Ok(())
    }

    fn print_context_hunk(&self, hunk: &[Change]) -> io::Result<()> {
        let Some(bounds) = self.context_bounds(hunk) else {
            return Ok(());
        };

        self.begin_output()?;

        self.write_bytes(b"***************")?;
        self.print_caption(bounds.first0)?;
        self.write_bytes(b"\n")?;

        self.print_context_range("***", 0, bounds.first0, bounds.last0)?;
        if bounds.changes.contains(Changes::OLD) {
            let mut next = hunk.iter().peekable();
            for i in bounds.first0..=bounds.last0 {
                while next.next_if(|change| change.end0() <= i).is_some() {}

                match next.peek() {
                    Some(change) if change.line0 <= i => {
                        let mark = if change.inserted > 0 { "!" } else { "-" };
                        self.print_line(LineFlag::Spaced(mark), 0, i, Some(ColorContext::Delete))?;
                    }
                    _ => self.print_line(LineFlag::Spaced(" "), 0, i, Some(ColorContext::Delete))?,
                }
            }
        }

        self.print_context_range("---", 1, bounds.first1, bounds.last1)?;
        if bounds.changes.contains(Changes::NEW) {
            let mut next = hunk.iter().peekable();
            for i in bounds.first1..=bounds.last1 {
                while next.next_if(|change| change.end1() <= i).is_some() {}

                match next.peek() {
                    Some(change) if change.line1 <= i => {
                        let mark = if change.deleted > 0 { "!" } else { "+" };
                        self.print_line(LineFlag::Spaced(mark), 1, i, Some(ColorContext::Add))?;
                    }
                    _ => self.print_line(LineFlag::Spaced(" "), 1, i, Some(ColorContext::Add))?,
                }
            }
        }

        Ok(())
    }

    /// `*** 1,5 ****` or `--- 1,5 ----`.
    fn print_context_range(&self, mark: &str, file: usize, first: Lin, last: Lin) -> io::Result<()> {
        let fill = &mark[..1];
        let range = number_range(self.tables[file], first, last, ',');

        self.session.set_color_context(ColorContext::LineNumber)?;
        self.write_bytes(format!("{mark} {range} {}", fill.repeat(4)).as_bytes())?;
        self.session.set_color_context(ColorContext::Reset)?;
        self.write_bytes(b"\n")
    }

    fn print_unified_hunk(&self, hunk: &[Change]) -> io::Result<()> {
        let Some(bounds) = self.context_bounds(hunk) else {
            return Ok(());
        };

        self.begin_output()?;

        self.session.set_color_context(ColorContext::LineNumber)?;
        let header = format!(
            "@@ -{} +{} @@",
            unified_range(self.tables[0], bounds.first0, bounds.last0),
            unified_range(self.tables[1], bounds.first1, bounds.last1),
        );
        self.write_bytes(header.as_bytes())?;
        self.session.set_color_context(ColorContext::Reset)?;
        self.print_caption(bounds.first0)?;
        self.write_bytes(b"\n")?;

        let mut changes = hunk.iter().peekable();
        let (mut i, mut j) = (bounds.first0, bounds.first1);
        while i <= bounds.last0 || j <= bounds.last1 {
            match changes.peek() {
                Some(change) if i >= change.line0 => {
                    for _ in 0..change.deleted {
                        self.print_line(LineFlag::Glued(b'-'), 0, i, Some(ColorContext::Delete))?;
                        i += 1;
                    }
                    for _ in 0..change.inserted {
                        self.print_line(LineFlag::Glued(b'+'), 1, j, Some(ColorContext::Add))?;
                        j += 1;
                    }
                    changes.next();
                }
                _ => {
                    self.print_line(LineFlag::Glued(b' '), 0, i, None)?;
                    i += 1;
                    j += 1;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputStyle;
    use crate::artifacts::format::tests::{render, table};
    use crate::artifacts::options::DiffOptions;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn unified() -> DiffOptions {
        DiffOptions {
            output_style: OutputStyle::Unified,
            context: 3,
            ..DiffOptions::default()
        }
    }

    #[fixture]
    fn context() -> DiffOptions {
        DiffOptions {
            output_style: OutputStyle::Context,
            context: 3,
            ..DiffOptions::default()
        }
    }

    /// Drop the two file header lines.
    fn body(output: &str) -> String {
        output.splitn(3, '\n').nth(2).unwrap_or_default().to_string()
    }

    #[rstest]
    #[case(0, 0, "1")]
    #[case(0, 3, "1,4")]
    #[case(2, 1, "2,0")]
    #[case(0, -1, "0,0")]
    fn unified_ranges(#[case] a: Lin, #[case] b: Lin, #[case] expected: &str) {
        assert_eq!(unified_range(&table("x\n"), a, b), expected);
    }

    #[rstest]
    fn unified_replacement(unified: DiffOptions) {
        let output = render("a\nb\nc\n", "a\nx\nc\n", unified);

        assert_eq!(body(&output), "@@ -1,3 +1,3 @@\n a\n-b\n+x\n c\n");
    }

    #[rstest]
    fn unified_insertion_into_empty_file(unified: DiffOptions) {
        let output = render("", "a\nb\n", unified);

        assert_eq!(body(&output), "@@ -0,0 +1,2 @@\n+a\n+b\n");
    }

    #[rstest]
    fn unified_context_is_clipped_to_the_file(unified: DiffOptions) {
        let lines: String = (1..=10).map(|i| format!("{i}\n")).collect();
        let changed = lines.replace("9\n", "nine\n");

        let output = render(&lines, &changed, unified);

        assert_eq!(body(&output), "@@ -6,5 +6,5 @@\n 6\n 7\n 8\n-9\n+nine\n 10\n");
    }

    #[rstest]
    fn unified_merges_nearby_changes(unified: DiffOptions) {
        let lines: String = (1..=20).map(|i| format!("{i}\n")).collect();
        let changed = lines.replace("5\n", "five\n").replace("11\n", "eleven\n");

        let output = render(&lines, &changed, unified);

        assert!(body(&output).starts_with("@@ -2,13 +2,13 @@\n"), "{output}");
    }

    #[rstest]
    fn unified_marks_missing_newline(unified: DiffOptions) {
        let output = render("a\nb\n", "a\nb", unified);

        assert_eq!(
            body(&output),
            "@@ -1,2 +1,2 @@\n a\n-b\n+b\n\\ No newline at end of file\n"
        );
    }

    #[rstest]
    fn context_replacement(context: DiffOptions) {
        let output = render("a\nb\nc\n", "a\nx\nc\n", context);

        assert_eq!(
            body(&output),
            "***************\n*** 1,3 ****\n  a\n! b\n  c\n--- 1,3 ----\n  a\n! x\n  c\n"
        );
    }

    #[rstest]
    fn context_deletion_leaves_new_side_empty(context: DiffOptions) {
        let output = render("a\nb\nc\n", "a\nc\n", context);

        assert_eq!(
            body(&output),
            "***************\n*** 1,3 ****\n  a\n- b\n  c\n--- 1,2 ----\n"
        );
    }

    #[rstest]
    fn context_insertion_leaves_old_side_empty(context: DiffOptions) {
        let output = render("a\nc\n", "a\nb\nc\n", context);

        assert_eq!(
            body(&output),
            "***************\n*** 1,2 ****\n--- 1,3 ----\n  a\n+ b\n  c\n"
        );
    }

    fn render_colored(options: DiffOptions, a: &str, b: &str) -> String {
        use crate::areas::session::Session;
        use crate::artifacts::diff::analysis::diff_tables;
        use crate::artifacts::format::Preamble;
        use crate::testing::SharedBuffer;

        let buffer = SharedBuffer::default();
        let session = Session::new(options, Box::new(buffer.clone())).with_colors(true);
        let (a, b) = (table(a), table(b));
        let mut script = diff_tables([&a, &b], session.options()).unwrap();
        let preamble = Preamble {
            banner: None,
            labels: ["a".to_string(), "b".to_string()],
        };

        Renderer::new(&session, [&a, &b], &preamble)
            .render(&mut script)
            .unwrap();

        buffer.contents()
    }

    #[test]
    fn colors_wrap_changed_lines() {
        assert_eq!(
            render_colored(unified(), "a\n", "b\n"),
            "\x1b[1m--- a\x1b[0m\n\x1b[1m+++ b\x1b[0m\n\
             \x1b[36m@@ -1 +1 @@\x1b[0m\n\
             \x1b[31m-a\x1b[0m\n\x1b[32m+b\x1b[0m\n"
        );
    }

    #[test]
    fn context_blocks_are_colored_whole() {
        assert_eq!(
            render_colored(context(), "a\nb\n", "a\nc\n"),
            "\x1b[1m*** a\x1b[0m\n\x1b[1m--- b\x1b[0m\n***************\n\
             \x1b[36m*** 1,2 ****\x1b[0m\n\
             \x1b[31m  a\x1b[0m\n\x1b[31m! b\x1b[0m\n\
             \x1b[36m--- 1,2 ----\x1b[0m\n\
             \x1b[32m  a\x1b[0m\n\x1b[32m! c\x1b[0m\n"
        );
    }
}
