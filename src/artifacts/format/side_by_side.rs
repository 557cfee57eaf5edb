use super::Renderer;
use crate::Lin;
use crate::artifacts::color::ColorContext;
use crate::artifacts::diff::change::{Change, EditScript};
use crate::artifacts::diff::triviality::Changes;
use crate::artifacts::lines::line_table::LineTable;
use std::io;
use unicode_width::UnicodeWidthChar;

/// Narrowest gutter that still fits a separator between two columns.
const GUTTER_WIDTH_MINIMUM: usize = 3;

/// Column geometry of side-by-side output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Widest text printed in either column.
    pub half_width: usize,
    /// Column where the right-hand text starts.
    pub column2: usize,
}

impl Layout {
    /// Split `width` columns in two, starting the right column on a tab
    /// stop unless tabs are expanded.
    pub fn new(width: usize, tab_size: usize, expand_tabs: bool) -> Self {
        let t = if expand_tabs { 1 } else { tab_size };
        let offset = (width + t + GUTTER_WIDTH_MINIMUM) / (2 * t) * t;
        let half_width = offset
            .saturating_sub(GUTTER_WIDTH_MINIMUM)
            .min(width.saturating_sub(offset));

        Layout {
            half_width,
            column2: if half_width > 0 { offset } else { width },
        }
    }

    fn separator_column(&self) -> usize {
        (self.half_width + self.column2).saturating_sub(1) / 2
    }
}

/// One side of a printed row.
#[derive(Debug, Clone, Copy)]
struct Half<'t> {
    text: &'t [u8],
    newline: bool,
}

impl<'t> Half<'t> {
    fn of(table: &'t LineTable, i: Lin) -> Self {
        Half {
            text: table.content(i),
            newline: table.has_newline(i),
        }
    }
}

impl Renderer<'_> {
    fn layout(&self) -> Layout {
        let options = self.options();
        Layout::new(options.width, options.tab_size, options.expand_tabs)
    }

    pub(super) fn print_sdiff_script(&self, script: &EditScript) -> io::Result<()> {
        self.begin_output()?;

        let mut next = [0, 0];
        for hunk in self.hunks(script) {
            self.print_sdiff_hunk(hunk, &mut next)?;
        }

        let [a, b] = self.tables;
        self.print_sdiff_common_lines(&mut next, a.len(), b.len())
    }

    /// Print the unchanged lines between `next` and the limits. Lines of a
    /// trivial hunk land here too, and may not pair up.
    fn print_sdiff_common_lines(&self, next: &mut [Lin; 2], limit0: Lin, limit1: Lin) -> io::Result<()> {
        let [mut i0, mut i1] = *next;

        if !self.options().suppress_common_lines {
            while i0 < limit0 && i1 < limit1 {
                if self.options().left_column {
                    self.print_sdiff_line(Some(i0), b'(', None)?;
                } else {
                    self.print_sdiff_line(Some(i0), b' ', Some(i1))?;
                }
                i0 += 1;
                i1 += 1;
            }
            for i in i1..limit1 {
                self.print_sdiff_line(None, b')', Some(i))?;
            }
            for i in i0..limit0 {
                self.print_sdiff_line(Some(i), b'(', None)?;
            }
        }

        *next = [limit0, limit1];
        Ok(())
    }

    fn print_sdiff_hunk(&self, hunk: &[Change], next: &mut [Lin; 2]) -> io::Result<()> {
        let bounds = self.filter.analyze(hunk);
        if bounds.changes.is_empty() {
            return Ok(());
        }

        self.print_sdiff_common_lines(next, bounds.first0, bounds.first1)?;

        let (mut i, mut j) = (bounds.first0, bounds.first1);
        let mut changes = bounds.changes;
        if changes == Changes::CHANGED {
            while i <= bounds.last0 && j <= bounds.last1 {
                self.print_sdiff_line(Some(i), b'|', Some(j))?;
                i += 1;
                j += 1;
            }
            changes.set(Changes::OLD, i <= bounds.last0);
            changes.set(Changes::NEW, j <= bounds.last1);
            *next = [i, j];
        }

        if changes.contains(Changes::NEW) {
            for j in j..=bounds.last1 {
                self.print_sdiff_line(None, b'>', Some(j))?;
            }
            next[1] = bounds.last1 + 1;
        }

        if changes.contains(Changes::OLD) {
            for i in i..=bounds.last0 {
                self.print_sdiff_line(Some(i), b'<', None)?;
            }
            next[0] = bounds.last0 + 1;
        }

        Ok(())
    }

    /// Print line `left` of A and line `right` of B around `separator`.
    fn print_sdiff_line(&self, left: Option<Lin>, separator: u8, right: Option<Lin>) -> io::Result<()> {
        let color = match separator {
            b'<' => Some(ColorContext::Delete),
            b'>' => Some(ColorContext::Add),
            _ => None,
        };
        if let Some(color) = color {
            self.session.set_color_context(color)?;
        }

        let left = left.map(|i| Half::of(self.tables[0], i));
        let right = right.map(|i| Half::of(self.tables[1], i));
        let left_newline = left.is_some_and(|half| half.newline);
        let right_newline = right.is_some_and(|half| half.newline);

        // Mark a pair of lines that differ only in one of them lacking
        // a final newline.
        let separator = match separator {
            b'|' if left_newline != right_newline => {
                if left_newline { b'/' } else { b'\\' }
            }
            other => other,
        };

        let layout = self.layout();
        let rows = if self.options().wrap && layout.half_width > 0 {
            let tab_size = self.options().tab_size;
            let wrap = |half: Option<Half<'_>>| {
                half.map(|half| wrap_text(half.text, layout.half_width, tab_size))
                    .unwrap_or_default()
            };
            let (left_rows, right_rows) = (wrap(left), wrap(right));

            (0..left_rows.len().max(right_rows.len()))
                .map(|k| {
                    (
                        left_rows.get(k).cloned(),
                        right_rows.get(k).cloned(),
                    )
                })
                .collect()
        } else {
            vec![(
                left.map(|half| half.text.to_vec()),
                right.map(|half| half.text.to_vec()),
            )]
        };

        let mut out = Vec::new();
        let last_row = rows.len().saturating_sub(1);
        for (k, (left, right)) in rows.iter().enumerate() {
            self.layout_row(&mut out, &layout, left.as_deref(), separator, right.as_deref());
            if k < last_row || left_newline || right_newline {
                out.push(b'\n');
            }
        }
        self.write_bytes(&out)?;
        self.session.process_signals()?;

        if color.is_some() {
            self.session.set_color_context(ColorContext::Reset)?;
        }

        Ok(())
    }

    fn layout_row(&self, out: &mut Vec<u8>, layout: &Layout, left: Option<&[u8]>, separator: u8, right: Option<&[u8]>) {
        let mut column = 0;

        if let Some(text) = left {
            column = self.print_half_line(out, text, 0, layout.half_width);
        }

        if separator != b' ' {
            column = self.tab_from_to(out, column, layout.separator_column()) + 1;
            out.push(separator);
        }

        if let Some(text) = right.filter(|text| !text.is_empty()) {
            column = self.tab_from_to(out, column, layout.column2);
            self.print_half_line(out, text, column, layout.half_width);
        }
    }

    /// Move from column `from` to column `to`, with tabs where allowed.
    fn tab_from_to(&self, out: &mut Vec<u8>, mut from: usize, to: usize) -> usize {
        let options = self.options();
        let tab_size = options.tab_size;

        if !options.expand_tabs {
            let mut tab = from + tab_size - from % tab_size;
            while tab <= to {
                out.push(b'\t');
                from = tab;
                tab += tab_size;
            }
        }
        while from < to {
            out.push(b' ');
            from += 1;
        }

        to
    }

    /// Print `text` truncated to `bound` columns and return the column
    /// reached. `indent` is where the text starts, restored after a
    /// carriage return.
    fn print_half_line(&self, out: &mut Vec<u8>, text: &[u8], indent: usize, bound: usize) -> usize {
        let options = self.options();
        let tab_size = options.tab_size;
        let (mut in_position, mut out_position) = (0, 0);
        let mut rest = text;

        while let Some(&c) = rest.first() {
            let mut len = 1;
            match c {
                b'\t' => {
                    let spaces = tab_size - in_position % tab_size;
                    if in_position == out_position {
                        let tab_stop = out_position + spaces;
                        if options.expand_tabs {
                            while out_position < tab_stop.min(bound) {
                                out.push(b' ');
                                out_position += 1;
                            }
                        } else if tab_stop < bound {
                            out_position = tab_stop;
                            out.push(c);
                        }
                    }
                    in_position += spaces;
                }
                b'\r' => {
                    out.push(c);
                    self.tab_from_to(out, 0, indent);
                    in_position = 0;
                    out_position = 0;
                }
                b'\x08' => {
                    if in_position != 0 {
                        in_position -= 1;
                        if in_position < bound {
                            if out_position <= in_position {
                                // Make up for a tab suppressed past the bound.
                                while out_position < in_position {
                                    out.push(b' ');
                                    out_position += 1;
                                }
                            } else {
                                out_position = in_position;
                                out.push(c);
                            }
                        }
                    }
                }
                _ => match decode_char(rest) {
                    Some((ch, n)) => {
                        len = n;
                        in_position += ch.width().unwrap_or(0);
                        if in_position <= bound {
                            out_position = in_position;
                            out.extend_from_slice(&rest[..n]);
                        }
                    }
                    None => {
                        if in_position < bound {
                            out.push(c);
                        }
                    }
                },
            }
            rest = &rest[len..];
        }

        out_position
    }
}

fn decode_char(bytes: &[u8]) -> Option<(char, usize)> {
    let len = match *bytes.first()? {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return None,
    };
    let decoded = std::str::from_utf8(bytes.get(..len)?).ok()?;
    decoded.chars().next().map(|ch| (ch, len))
}

/// Break `text` into rows of at most `width` columns, expanding tabs. A
/// tab that does not fit ends its row.
fn wrap_text(text: &[u8], width: usize, tab_size: usize) -> Vec<Vec<u8>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut column = 0;
    let mut rest = text;

    while let Some(&c) = rest.first() {
        let (w, n) = if c == b'\t' {
            (tab_size - column % tab_size, 1)
        } else {
            decode_char(rest).map_or((0, 1), |(ch, n)| (ch.width().unwrap_or(0), n))
        };

        if column > 0 && column + w > width {
            rows.push(std::mem::take(&mut row));
            column = 0;
            if c == b'\t' {
                rest = &rest[1..];
                continue;
            }
        }

        if c == b'\t' {
            let w = w.min(width - column);
            row.resize(row.len() + w, b' ');
            column += w;
        } else {
            row.extend_from_slice(&rest[..n]);
            column += w;
        }
        rest = &rest[n..];
    }

    rows.push(row);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputStyle;
    use crate::artifacts::format::tests::render;
    use crate::artifacts::options::DiffOptions;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn narrow() -> DiffOptions {
        DiffOptions {
            output_style: OutputStyle::SideBySide,
            width: 20,
            expand_tabs: true,
            ..DiffOptions::default()
        }
    }

    #[rstest]
    #[case(130, 8, false, 61, 64)]
    #[case(130, 8, true, 63, 67)]
    #[case(80, 8, false, 37, 40)]
    #[case(20, 8, true, 8, 12)]
    #[case(3, 8, false, 0, 3)]
    fn column_layout(
        #[case] width: usize,
        #[case] tab_size: usize,
        #[case] expand_tabs: bool,
        #[case] half_width: usize,
        #[case] column2: usize,
    ) {
        assert_eq!(Layout::new(width, tab_size, expand_tabs), Layout { half_width, column2 });
    }

    #[test]
    fn default_layout_uses_tabs() {
        let options = DiffOptions {
            output_style: OutputStyle::SideBySide,
            ..DiffOptions::default()
        };

        let output = render("a\nb\n", "a\nc\n", options);

        let expected = format!("a{}a\nb{}{}|\tc\n", "\t".repeat(8), "\t".repeat(7), " ".repeat(6));
        assert_eq!(output, expected);
    }

    #[rstest]
    fn long_lines_are_truncated(narrow: DiffOptions) {
        assert_eq!(render("hello world\n", "x\n", narrow), "hello wo |  x\n");
    }

    #[rstest]
    fn wrapped_lines_continue_on_the_next_row(mut narrow: DiffOptions) {
        narrow.wrap = true;

        assert_eq!(render("hello world\n", "x\n", narrow), "hello wo |  x\nrld      |\n");
    }

    #[rstest]
    fn one_sided_lines(narrow: DiffOptions) {
        let output = render("a\nb\n", "a\n", narrow.clone());
        assert_eq!(output, format!("a{}a\nb        <\n", " ".repeat(11)));

        let output = render("a\n", "a\nb\n", narrow);
        assert_eq!(output, format!("a{}a\n         >  b\n", " ".repeat(11)));
    }

    #[rstest]
    fn suppressed_common_lines(mut narrow: DiffOptions) {
        narrow.suppress_common_lines = true;

        assert_eq!(render("a\nb\nc\n", "a\nx\nc\n", narrow), "b        |  x\n");
    }

    #[rstest]
    fn left_column_prints_common_lines_once(mut narrow: DiffOptions) {
        narrow.left_column = true;

        assert_eq!(render("a\nb\n", "a\nx\n", narrow), "a        (\nb        |  x\n");
    }

    #[rstest]
    fn missing_newline_bends_the_separator(narrow: DiffOptions) {
        assert_eq!(render("a\n", "b", narrow.clone()), "a        /  b\n");
        assert_eq!(render("a", "b\n", narrow), "a        \\  b\n");
    }

    #[rstest]
    fn wide_characters_take_two_columns(narrow: DiffOptions) {
        assert_eq!(render("日本語です\n", "x\n", narrow), "日本語で |  x\n");
    }

    #[rstest]
    #[case(b"abcdef", 4, vec![b"abcd".to_vec(), b"ef".to_vec()])]
    #[case(b"a\tb", 4, vec![b"a".to_vec(), b"b".to_vec()])]
    #[case(b"\tb", 4, vec![b"    ".to_vec(), b"b".to_vec()])]
    #[case(b"", 4, vec![Vec::new()])]
    fn text_wrapping(#[case] text: &[u8], #[case] width: usize, #[case] expected: Vec<Vec<u8>>) {
        assert_eq!(wrap_text(text, width, 8), expected);
    }
}
