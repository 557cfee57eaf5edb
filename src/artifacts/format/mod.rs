//! Renderers for every output style
//!
//! A [`Renderer`] prints the hunks of one file pair. Each style lives in its
//! own module as an `impl Renderer` block:
//!
//! - `normal`: `1,2c3` headers with `<`/`>` lines
//! - `context`: the context (`-c`) and unified (`-u`) styles
//! - `ed`: ed scripts, forward ed scripts and RCS scripts
//! - `side_by_side`: two columns separated by a change marker
//!
//! Shared pieces:
//!
//! - `header`: file labels, timestamps and the `diff ...` banner
//! - `function`: hunk captions taken from the nearest matching line
//! - `line_output`: line flags, tab expansion and missing-newline markers
//!
//! Nothing is written until the first hunk worth showing; a file pair
//! whose changes are all trivial produces no output at all.

pub mod context;
pub mod ed;
pub mod function;
pub mod header;
pub mod line_output;
pub mod normal;
pub mod side_by_side;

use crate::areas::session::Session;
use crate::artifacts::diff::change::{Change, EditScript};
use crate::artifacts::diff::hunk::{HunkPolicy, Hunks};
use crate::artifacts::diff::triviality::TrivialityFilter;
use crate::artifacts::lines::line_table::LineTable;
use crate::artifacts::options::DiffOptions;
use crate::{Lin, OutputStyle};
use function::FunctionFinder;
use std::cell::Cell;
use std::io::{self, Write};

/// Dumps change records to stderr when built with the `debug_script` feature.
///
/// # Usage
/// ```rust,ignore
/// debug_log!("hunk {:?}", hunk);
/// ```
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_script")]
        {
            eprintln!($($arg)*);
        }
    };
}

/// Text printed once before the first hunk of a file pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preamble {
    /// `diff SWITCHES A B`, only in runs comparing several file pairs.
    pub banner: Option<String>,
    /// What follows `***`/`---` (context) or `---`/`+++` (unified).
    pub labels: [String; 2],
}

/// Prints the edit script of one file pair in the session's output style.
pub struct Renderer<'a> {
    session: &'a Session,
    tables: [&'a LineTable; 2],
    filter: TrivialityFilter<'a>,
    preamble: &'a Preamble,
    begun: Cell<bool>,
    functions: FunctionFinder<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(session: &'a Session, tables: [&'a LineTable; 2], preamble: &'a Preamble) -> Self {
        let options = session.options();

        Renderer {
            session,
            tables,
            filter: TrivialityFilter::new(tables, options),
            preamble,
            begun: Cell::new(false),
            functions: FunctionFinder::new(tables[0], options.function_regex.as_ref()),
        }
    }

    pub fn options(&self) -> &'a DiffOptions {
        self.session.options()
    }

    pub fn render(&self, script: &mut EditScript) -> io::Result<()> {
        let style = self.options().output_style;
        tracing::debug!(?style, changes = script.len(), "rendering");

        match style {
            OutputStyle::Normal => self.print_normal_script(script),
            OutputStyle::Context | OutputStyle::Unified => {
                if self.filter.is_active() {
                    self.filter.mark_ignorable(script);
                }
                if style == OutputStyle::Context {
                    self.print_context_script(script)
                } else {
                    self.print_unified_script(script)
                }
            }
            OutputStyle::Ed => self.print_ed_script(script),
            OutputStyle::ForwardEd => self.print_forward_ed_script(script),
            OutputStyle::Rcs => self.print_rcs_script(script),
            OutputStyle::SideBySide => self.print_sdiff_script(script),
        }?;

        self.session.flush()
    }

    fn hunks<'s>(&self, script: &'s EditScript) -> impl Iterator<Item = &'s [Change]> + use<'s> {
        Hunks::new(script, HunkPolicy::for_options(self.options())).inspect(|_hunk| {
            debug_log!("hunk {:?}", _hunk);
        })
    }

    /// Print the banner and file headers the first time it is called.
    fn begin_output(&self) -> io::Result<()> {
        if self.begun.replace(true) {
            return Ok(());
        }

        if let Some(banner) = &self.preamble.banner {
            writeln!(self.session.writer(), "{banner}")?;
        }

        match self.options().output_style {
            OutputStyle::Context => self.print_file_headers(["***", "---"]),
            OutputStyle::Unified => self.print_file_headers(["---", "+++"]),
            _ => Ok(()),
        }
    }

    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        self.session.writer().write_all(bytes)
    }
}

/// `a,b` for a multi-line range, `b` otherwise (also for an empty range,
/// which names the line before it).
fn number_range(table: &LineTable, a: Lin, b: Lin, separator: char) -> String {
    let (a, b) = (table.translate(a), table.translate(b));
    if b > a {
        format!("{a}{separator}{b}")
    } else {
        b.to_string()
    }
}
