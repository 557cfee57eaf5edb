use super::Renderer;
use crate::OutputStyle;
use crate::areas::workspace::Source;
use crate::artifacts::color::ColorContext;
use chrono::{DateTime, Local};
use std::io;
use std::time::SystemTime;

const CONTEXT_TIME_FORMAT: &str = "%a %b %e %T %Y";
const UNIFIED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f %z";

/// Text after the `***`/`---`/`+++` mark of a file header: the explicit
/// label if one was given, otherwise the name and modification time.
pub fn file_label(source: &Source, style: OutputStyle, label: Option<&str>) -> String {
    if let Some(label) = label {
        return label.to_string();
    }

    format!("{}\t{}", source.name, timestamp(source.modified, style))
}

pub fn timestamp(time: SystemTime, style: OutputStyle) -> String {
    let format = if style == OutputStyle::Context {
        CONTEXT_TIME_FORMAT
    } else {
        UNIFIED_TIME_FORMAT
    };

    DateTime::<Local>::from(time).format(format).to_string()
}

/// The `diff SWITCHES A B` line that introduces a file pair in a run over
/// directories.
pub fn banner(switches: &str, names: [&str; 2]) -> String {
    format!("diff{switches} {} {}", quote_name(names[0]), quote_name(names[1]))
}

/// Names with blanks, quotes or control characters are double quoted with
/// C-style escapes so the banner stays one unambiguous line.
fn quote_name(name: &str) -> String {
    let needs_quotes = name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == '\\');
    if !needs_quotes {
        return name.to_string();
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\t' => quoted.push_str("\\t"),
            '\n' => quoted.push_str("\\n"),
            c if c.is_control() => quoted.push_str(&format!("\\{:03o}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl Renderer<'_> {
    pub(super) fn print_file_headers(&self, marks: [&str; 2]) -> io::Result<()> {
        for (mark, label) in marks.iter().zip(&self.preamble.labels) {
            self.session.set_color_context(ColorContext::Header)?;
            self.write_bytes(format!("{mark} {label}").as_bytes())?;
            self.session.set_color_context(ColorContext::Reset)?;
            self.write_bytes(b"\n")?;
        }

        Ok(())
    }
}
