use crate::Lin;
use crate::artifacts::core::error::{DiffError, reserve};

/// Number of leading bytes inspected when deciding whether input is binary.
pub const BINARY_PROBE_SIZE: usize = 64 * 1024;

/// Whether `data` looks like binary content (a NUL in its first 64 KiB).
pub fn is_binary(data: &[u8]) -> bool {
    data[..data.len().min(BINARY_PROBE_SIZE)].contains(&0)
}

/// Numbered view of one input's lines.
///
/// Every line keeps its terminating newline inside the buffer; only the last
/// line may lack one, in which case [`LineTable::missing_newline`] is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable {
    buffer: Vec<u8>,
    /// Byte offset of each line, plus one trailing entry equal to the
    /// buffer length.
    starts: Vec<usize>,
    missing_newline: bool,
    prefix_lines: Lin,
}

impl Default for LineTable {
    fn default() -> Self {
        LineTable {
            buffer: Vec::new(),
            starts: vec![0],
            missing_newline: false,
            prefix_lines: 0,
        }
    }
}

impl LineTable {
    /// Split `buffer` into lines.
    ///
    /// With `strip_trailing_cr`, a carriage return right before a newline is
    /// removed from the line.
    pub fn new(buffer: Vec<u8>, strip_trailing_cr: bool) -> Result<Self, DiffError> {
        let buffer = if strip_trailing_cr {
            strip_carriage_returns(buffer)
        } else {
            buffer
        };

        let line_count = count_newlines(&buffer) + 2;
        let mut starts = Vec::new();
        reserve(&mut starts, line_count, "line table")?;

        starts.push(0);
        starts.extend(
            buffer
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );

        let missing_newline = buffer.last().is_some_and(|&b| b != b'\n');
        if missing_newline {
            starts.push(buffer.len());
        }

        Ok(LineTable {
            buffer,
            starts,
            missing_newline,
            prefix_lines: 0,
        })
    }

    /// Treat this table as a window into a larger input that starts after
    /// `prefix_lines` lines, which shifts every displayed line number.
    pub fn with_prefix_lines(mut self, prefix_lines: Lin) -> Self {
        self.prefix_lines = prefix_lines;
        self
    }

    pub fn len(&self) -> Lin {
        (self.starts.len() - 1) as Lin
    }

    pub fn is_empty(&self) -> bool {
        self.starts.len() == 1
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn missing_newline(&self) -> bool {
        self.missing_newline
    }

    pub fn prefix_lines(&self) -> Lin {
        self.prefix_lines
    }

    /// The raw bytes of line `i`, including its newline if it has one.
    pub fn line(&self, i: Lin) -> &[u8] {
        let i = i as usize;
        &self.buffer[self.starts[i]..self.starts[i + 1]]
    }

    /// The bytes of line `i` without its newline.
    pub fn content(&self, i: Lin) -> &[u8] {
        let line = self.line(i);
        line.strip_suffix(b"\n").unwrap_or(line)
    }

    pub fn has_newline(&self, i: Lin) -> bool {
        !(self.missing_newline && i == self.len() - 1)
    }

    /// Displayed 1-based number of the 0-based line `i`.
    pub fn translate(&self, i: Lin) -> Lin {
        i + self.prefix_lines + 1
    }

    /// Terminate an incomplete last line, for output styles that cannot
    /// represent one. Returns whether a newline was supplied.
    pub fn ensure_final_newline(&mut self) -> bool {
        if !self.missing_newline {
            return false;
        }

        self.buffer.push(b'\n');
        if let Some(last) = self.starts.last_mut() {
            *last += 1;
        }
        self.missing_newline = false;
        true
    }
}

fn count_newlines(buffer: &[u8]) -> usize {
    buffer.iter().filter(|&&b| b == b'\n').count()
}

fn strip_carriage_returns(buffer: Vec<u8>) -> Vec<u8> {
    if !buffer.windows(2).any(|w| w == b"\r\n") {
        return buffer;
    }

    let mut stripped = Vec::with_capacity(buffer.len());
    let mut bytes = buffer.iter().peekable();
    while let Some(&b) = bytes.next() {
        if b == b'\r' && bytes.peek() == Some(&&b'\n') {
            continue;
        }
        stripped.push(b);
    }
    stripped
}
