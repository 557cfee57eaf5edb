use crate::artifacts::color::palette::Palette;
use crate::artifacts::core::error::DiffError;
use crate::artifacts::lines::equivalence::FoldRules;
use crate::{ColorMode, Lin, OutputStyle, WhiteSpace};
use regex::bytes::Regex;

/// Default context size of `-c` and `-u`.
pub const DEFAULT_CONTEXT: Lin = 3;

/// Default side-by-side output width.
pub const DEFAULT_WIDTH: usize = 130;

/// Everything that shapes one comparison run.
///
/// Built once by the command line front end, validated, then shared
/// read-only by every comparison in the run.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub output_style: OutputStyle,
    /// Unchanged lines printed around each hunk (context and unified styles).
    pub context: Lin,

    pub ignore_case: bool,
    pub white_space: WhiteSpace,
    pub ignore_blank_lines: bool,
    /// Changes whose every line matches are trivial.
    pub ignore_regex: Option<Regex>,
    /// Lines used as hunk captions (`-p`, `-F`).
    pub function_regex: Option<Regex>,

    pub text: bool,
    pub strip_trailing_cr: bool,
    pub minimal: bool,
    pub speed_large_files: bool,
    pub horizon_lines: Lin,

    pub expand_tabs: bool,
    pub initial_tab: bool,
    pub suppress_blank_empty: bool,
    pub tab_size: usize,

    pub width: usize,
    pub left_column: bool,
    pub suppress_common_lines: bool,
    pub wrap: bool,

    pub color: ColorMode,
    pub palette: Palette,
    pub labels: [Option<String>; 2],

    pub brief: bool,
    pub report_identical_files: bool,
    pub recursive: bool,
    pub new_file: bool,
    pub paginate: bool,
    /// Option text echoed in the `diff ...` line of multi-file runs.
    pub switch_string: String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            output_style: OutputStyle::Normal,
            context: 0,
            ignore_case: false,
            white_space: WhiteSpace::Significant,
            ignore_blank_lines: false,
            ignore_regex: None,
            function_regex: None,
            text: false,
            strip_trailing_cr: false,
            minimal: false,
            speed_large_files: false,
            horizon_lines: 0,
            expand_tabs: false,
            initial_tab: false,
            suppress_blank_empty: false,
            tab_size: 8,
            width: DEFAULT_WIDTH,
            left_column: false,
            suppress_common_lines: false,
            wrap: false,
            color: ColorMode::Never,
            palette: Palette::default(),
            labels: [None, None],
            brief: false,
            report_identical_files: false,
            recursive: false,
            new_file: false,
            paginate: false,
            switch_string: String::new(),
        }
    }
}

impl DiffOptions {
    /// Compile a list of patterns into one alternation. An empty list
    /// yields `None`.
    pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Option<Regex>, DiffError> {
        if patterns.is_empty() {
            return Ok(None);
        }

        for pattern in patterns {
            Regex::new(pattern.as_ref()).map_err(|source| DiffError::InvalidRegex {
                pattern: pattern.as_ref().to_string(),
                source,
            })?;
        }

        let joined = patterns
            .iter()
            .map(|p| format!("(?:{})", p.as_ref()))
            .collect::<Vec<_>>()
            .join("|");

        Regex::new(&joined)
            .map(Some)
            .map_err(|source| DiffError::InvalidRegex {
                pattern: joined,
                source,
            })
    }

    /// Reject combinations no comparison can run with.
    pub fn validate(&self) -> Result<(), DiffError> {
        if self.tab_size == 0 {
            return Err(DiffError::InvalidOption("invalid tabsize '0'".to_string()));
        }
        if self.width == 0 {
            return Err(DiffError::InvalidOption("invalid width '0'".to_string()));
        }
        if self.context < 0 {
            return Err(DiffError::InvalidOption(format!(
                "invalid context length '{}'",
                self.context
            )));
        }
        if self.horizon_lines < 0 {
            return Err(DiffError::InvalidOption(format!(
                "invalid horizon length '{}'",
                self.horizon_lines
            )));
        }
        // Keeps 2 * context + 1 from overflowing in the hunk builder.
        if self.context > Lin::MAX / 4 {
            return Err(DiffError::InvalidOption(format!(
                "context length '{}' is too large",
                self.context
            )));
        }

        Ok(())
    }

    /// Unchanged lines kept next to the compared region when identical ends
    /// are trimmed.
    pub fn horizon(&self) -> Lin {
        self.horizon_lines.max(self.context)
    }

    pub fn fold_rules(&self) -> FoldRules {
        FoldRules {
            ignore_case: self.ignore_case,
            white_space: self.white_space,
            tab_size: self.tab_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn patterns_are_alternated() {
        let regex = DiffOptions::compile_patterns(&["^#", "TODO"]).unwrap().unwrap();

        assert!(regex.is_match(b"# comment"));
        assert!(regex.is_match(b"x // TODO"));
        assert!(!regex.is_match(b"code"));
    }

    #[test]
    fn no_patterns_means_no_regex() {
        let patterns: [&str; 0] = [];

        assert!(DiffOptions::compile_patterns(&patterns).unwrap().is_none());
    }

    #[test]
    fn invalid_pattern_is_reported_by_itself() {
        let err = DiffOptions::compile_patterns(&["ok", "("]).unwrap_err();

        match err {
            DiffError::InvalidRegex { pattern, .. } => assert_eq!(pattern, "("),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case(DiffOptions { tab_size: 0, ..DiffOptions::default() })]
    #[case(DiffOptions { width: 0, ..DiffOptions::default() })]
    #[case(DiffOptions { context: -1, ..DiffOptions::default() })]
    #[case(DiffOptions { context: Lin::MAX, ..DiffOptions::default() })]
    fn validation_rejects_unusable_values(#[case] options: DiffOptions) {
        assert!(matches!(options.validate(), Err(DiffError::InvalidOption(_))));
    }

    #[rstest]
    #[case(0, 3, 3)]
    #[case(10, 3, 10)]
    #[case(0, 0, 0)]
    fn horizon_covers_the_context(#[case] horizon_lines: Lin, #[case] context: Lin, #[case] expected: Lin) {
        let options = DiffOptions {
            horizon_lines,
            context,
            ..DiffOptions::default()
        };

        assert_eq!(options.horizon(), expected);
    }
}
