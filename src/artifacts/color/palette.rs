use crate::artifacts::color::ColorContext;
use crate::artifacts::core::error::DiffError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Indicator {
    Left,
    Right,
    End,
    Reset,
    Header,
    Add,
    Delete,
    Line,
}

/// Two-letter palette keys, as accepted by `--palette`.
static INDICATORS: phf::Map<&'static str, Indicator> = phf::phf_map! {
    "lc" => Indicator::Left,
    "rc" => Indicator::Right,
    "ec" => Indicator::End,
    "rs" => Indicator::Reset,
    "hd" => Indicator::Header,
    "ad" => Indicator::Add,
    "de" => Indicator::Delete,
    "ln" => Indicator::Line,
};

/// SGR fragments used to color each output category.
///
/// A color sequence is `left + code + right`, e.g. `\e[` `32` `m`. Resets
/// always use `rs`; an `ec` entry is accepted and has no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    left: Vec<u8>,
    right: Vec<u8>,
    reset: Vec<u8>,
    header: Vec<u8>,
    add: Vec<u8>,
    delete: Vec<u8>,
    line: Vec<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            left: b"\x1b[".to_vec(),
            right: b"m".to_vec(),
            reset: b"0".to_vec(),
            header: b"1".to_vec(),
            add: b"32".to_vec(),
            delete: b"31".to_vec(),
            line: b"36".to_vec(),
        }
    }
}

impl Palette {
    /// Parse a palette specification on top of the default palette.
    ///
    /// The syntax is a `:`-separated list of `key=value` entries. Values may
    /// contain backslash escapes (`\e`, `\n`, `\033`, `\x1b`, `\_` for a
    /// space, ...) and caret notation (`^[`). `*.ext=value` entries are
    /// accepted for compatibility with `LS_COLORS`-style strings and ignored.
    pub fn parse(spec: &str) -> Result<Self, DiffError> {
        let mut palette = Palette::default();
        let bytes = spec.as_bytes();
        let mut pos = 0;

        while let Some(&c) = bytes.get(pos) {
            match c {
                b':' => pos += 1,
                b'*' => {
                    pos += 1;
                    decode_value(bytes, &mut pos, true)?;
                    expect_equals(bytes, &mut pos, spec)?;
                    decode_value(bytes, &mut pos, false)?;
                }
                _ => {
                    let label = bytes
                        .get(pos..pos + 2)
                        .and_then(|label| std::str::from_utf8(label).ok())
                        .ok_or_else(|| DiffError::InvalidPalette(spec.to_string()))?;
                    pos += 2;
                    expect_equals(bytes, &mut pos, spec)?;

                    let indicator = INDICATORS.get(label).copied().ok_or_else(|| {
                        DiffError::InvalidPalette(format!("unrecognized prefix: {label}"))
                    })?;
                    let value = decode_value(bytes, &mut pos, false)?;
                    if let Some(slot) = palette.slot_mut(indicator) {
                        *slot = value;
                    }
                }
            }
        }

        Ok(palette)
    }

    /// The bytes that switch the terminal into `context`.
    pub fn sequence(&self, context: ColorContext) -> Vec<u8> {
        let code = match context {
            ColorContext::Reset => &self.reset,
            ColorContext::Header => &self.header,
            ColorContext::Add => &self.add,
            ColorContext::Delete => &self.delete,
            ColorContext::LineNumber => &self.line,
        };

        let mut sequence = Vec::with_capacity(self.left.len() + code.len() + self.right.len());
        sequence.extend_from_slice(&self.left);
        sequence.extend_from_slice(code);
        sequence.extend_from_slice(&self.right);
        sequence
    }

    fn slot_mut(&mut self, indicator: Indicator) -> Option<&mut Vec<u8>> {
        let slot = match indicator {
            Indicator::Left => &mut self.left,
            Indicator::Right => &mut self.right,
            Indicator::End => return None,
            Indicator::Reset => &mut self.reset,
            Indicator::Header => &mut self.header,
            Indicator::Add => &mut self.add,
            Indicator::Delete => &mut self.delete,
            Indicator::Line => &mut self.line,
        };
        Some(slot)
    }
}

impl FromStr for Palette {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Palette::parse(s)
    }
}

fn expect_equals(bytes: &[u8], pos: &mut usize, spec: &str) -> Result<(), DiffError> {
    if bytes.get(*pos) == Some(&b'=') {
        *pos += 1;
        Ok(())
    } else {
        Err(DiffError::InvalidPalette(spec.to_string()))
    }
}

/// Decode one palette value starting at `pos`, stopping at `:` or the end of
/// input (or at `=` when `equals_end` is set). `pos` is left on the
/// terminator.
fn decode_value(bytes: &[u8], pos: &mut usize, equals_end: bool) -> Result<Vec<u8>, DiffError> {
    let invalid = || DiffError::InvalidPalette(String::from_utf8_lossy(bytes).into_owned());
    let mut out = Vec::new();

    loop {
        match bytes.get(*pos) {
            None | Some(b':') => return Ok(out),
            Some(b'=') if equals_end => return Ok(out),
            Some(b'\\') => {
                *pos += 1;
                let escaped = *bytes.get(*pos).ok_or_else(invalid)?;
                match escaped {
                    b'0'..=b'7' => {
                        let mut num: u8 = 0;
                        while let Some(&digit @ b'0'..=b'7') = bytes.get(*pos) {
                            num = num.wrapping_mul(8).wrapping_add(digit - b'0');
                            *pos += 1;
                        }
                        out.push(num);
                    }
                    b'x' | b'X' => {
                        *pos += 1;
                        let mut num: u8 = 0;
                        while let Some(digit) = bytes.get(*pos).and_then(|&d| (d as char).to_digit(16)) {
                            num = num.wrapping_mul(16).wrapping_add(digit as u8);
                            *pos += 1;
                        }
                        out.push(num);
                    }
                    other => {
                        out.push(match other {
                            b'a' => 0x07,
                            b'b' => 0x08,
                            b'e' => 0x1b,
                            b'f' => 0x0c,
                            b'n' => b'\n',
                            b'r' => b'\r',
                            b't' => b'\t',
                            b'v' => 0x0b,
                            b'?' => 0x7f,
                            b'_' => b' ',
                            literal => literal,
                        });
                        *pos += 1;
                    }
                }
            }
            Some(b'^') => {
                *pos += 1;
                match bytes.get(*pos) {
                    Some(&c @ b'@'..=b'~') => out.push(c & 0x1f),
                    Some(b'?') => out.push(0x7f),
                    _ => return Err(invalid()),
                }
                *pos += 1;
            }
            Some(&c) => {
                out.push(c);
                *pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ColorContext::Header, b"\x1b[1m".as_slice())]
    #[case(ColorContext::Add, b"\x1b[32m".as_slice())]
    #[case(ColorContext::Delete, b"\x1b[31m".as_slice())]
    #[case(ColorContext::LineNumber, b"\x1b[36m".as_slice())]
    #[case(ColorContext::Reset, b"\x1b[0m".as_slice())]
    fn default_palette_uses_standard_sgr_codes(#[case] context: ColorContext, #[case] expected: &[u8]) {
        assert_eq!(Palette::default().sequence(context), expected.to_vec());
    }

    #[test]
    fn entries_override_only_their_own_category() {
        let palette = Palette::parse("ad=1;32:de=1;31").unwrap();

        assert_eq!(palette.sequence(ColorContext::Add), b"\x1b[1;32m".to_vec());
        assert_eq!(palette.sequence(ColorContext::Delete), b"\x1b[1;31m".to_vec());
        assert_eq!(palette.sequence(ColorContext::Header), b"\x1b[1m".to_vec());
    }

    #[test]
    fn escapes_and_caret_notation_are_decoded() {
        let palette = Palette::parse(r"lc=\033[:rc=^M\x41\_:ln=\e").unwrap();

        assert_eq!(palette.sequence(ColorContext::LineNumber), b"\x1b[\x1b\rA ".to_vec());
    }

    #[test]
    fn end_sequence_leaves_reset_alone() {
        let palette = Palette::parse("ec=X:rs=7").unwrap();

        assert_eq!(palette.sequence(ColorContext::Reset), b"\x1b[7m".to_vec());
        assert_eq!(Palette::parse("ec=X").unwrap(), Palette::default());
    }

    #[test]
    fn extension_entries_are_ignored() {
        let palette = Palette::parse("*.rs=01;31:hd=4").unwrap();

        assert_eq!(palette.sequence(ColorContext::Header), b"\x1b[4m".to_vec());
    }

    #[rstest]
    #[case("zz=1")]
    #[case("ad")]
    #[case("ad:32")]
    #[case(r"ad=\")]
    #[case("ad=^1")]
    fn malformed_palettes_are_rejected(#[case] spec: &str) {
        assert!(matches!(Palette::parse(spec), Err(DiffError::InvalidPalette(_))));
    }
}
