use super::Renderer;
use crate::Lin;
use crate::artifacts::color::ColorContext;
use std::io;

/// Bytes written between two polls for pending signals.
const MAX_CHUNK: usize = 1024;

const NO_NEWLINE_MARKER: &[u8] = b"\n\\ No newline at end of file\n";

/// How a printed line is introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFlag {
    /// The mark, then a space (a tab with `--initial-tab`).
    Spaced(&'static str),
    /// A one-character mark directly followed by the text, as in unified
    /// output. A space mark becomes a tab with `--initial-tab`.
    Glued(u8),
    /// The text alone. Ed-family scripts cannot express a missing final
    /// newline, so none is marked.
    Bare,
}

impl Renderer<'_> {
    /// Print line `i` of input `file`, in `color` if given, followed by its
    /// newline or by the missing-newline marker.
    pub(super) fn print_line(
        &self,
        flag: LineFlag,
        file: usize,
        i: Lin,
        color: Option<ColorContext>,
    ) -> io::Result<()> {
        let table = self.tables[file];
        let text = table.content(i);
        let options = self.options();
        let blank_suppressed = options.suppress_blank_empty && text.is_empty();

        if let Some(color) = color {
            self.session.set_color_context(color)?;
        }

        let mut reprint = Vec::new();
        match flag {
            LineFlag::Spaced(mark) => {
                reprint.extend_from_slice(mark.as_bytes());
                reprint.push(if options.initial_tab { b'\t' } else { b' ' });

                if !blank_suppressed {
                    self.write_bytes(&reprint)?;
                } else if mark != " " {
                    self.write_bytes(mark.as_bytes())?;
                }
            }
            LineFlag::Glued(b' ') => {
                if !blank_suppressed {
                    self.write_bytes(if options.initial_tab { b"\t" } else { b" " })?;
                }
            }
            LineFlag::Glued(mark) => {
                self.write_bytes(&[mark])?;
                if options.initial_tab && !blank_suppressed {
                    self.write_bytes(b"\t")?;
                }
            }
            LineFlag::Bare => {}
        }

        self.output_1_line(text, &reprint)?;
        self.session.set_color_context(ColorContext::Reset)?;

        if table.has_newline(i) {
            self.write_bytes(b"\n")
        } else if flag == LineFlag::Bare {
            Ok(())
        } else {
            self.write_bytes(NO_NEWLINE_MARKER)
        }
    }

    /// Write the text of one line, expanding tabs with `--expand-tabs`.
    ///
    /// `reprint` is written again after every carriage return inside the
    /// line, so that overprinted text stays behind its flag.
    pub(super) fn output_1_line(&self, text: &[u8], reprint: &[u8]) -> io::Result<()> {
        let options = self.options();
        let expanded;
        let bytes = if options.expand_tabs {
            expanded = expand_tabs(text, reprint, options.tab_size);
            &expanded[..]
        } else {
            text
        };

        for chunk in bytes.chunks(MAX_CHUNK) {
            self.write_bytes(chunk)?;
            self.session.process_signals()?;
        }

        Ok(())
    }
}

fn expand_tabs(text: &[u8], reprint: &[u8], tab_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut column = 0;

    for (n, &c) in text.iter().enumerate() {
        match c {
            b'\t' => {
                let spaces = tab_size - column % tab_size;
                out.resize(out.len() + spaces, b' ');
                column += spaces;
            }
            b'\r' => {
                out.push(c);
                if n + 1 < text.len() {
                    out.extend_from_slice(reprint);
                }
                column = 0;
            }
            b'\x08' => {
                if column > 0 {
                    column -= 1;
                    out.push(c);
                }
            }
            _ => {
                // Continuation bytes of a UTF-8 sequence take no column.
                if c == b' ' || c.is_ascii_graphic() || c >= 0xc0 {
                    column += 1;
                }
                out.push(c);
            }
        }
    }

    out
}
