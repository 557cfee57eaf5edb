use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use ldiff::areas::session::Session;
use ldiff::artifacts::color::palette::Palette;
use ldiff::artifacts::core::PagerWriter;
use ldiff::artifacts::diff::verdict::Verdict;
use ldiff::artifacts::options::{DEFAULT_WIDTH, DiffOptions};
use ldiff::commands::report_trouble;
use ldiff::{ColorMode, Lin, OutputStyle, WhiteSpace};
use minus::Pager;
use std::ffi::OsString;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Pattern `-p` uses to find the enclosing function of a hunk.
const C_FUNCTION_PATTERN: &str = "^[[:alpha:]$_]";

#[derive(Parser)]
#[command(
    name = "ldiff",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Compare files line by line",
    long_about = "Compare FILE1 and FILE2 line by line and print the differences \
    in one of several classic formats. Directories are compared entry by entry.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[arg(long, help = "Output a normal diff (the default)")]
    normal: bool,
    #[arg(
        short = 'c',
        long = "context",
        value_name = "NUM",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "3",
        help = "Output NUM (default 3) lines of copied context"
    )]
    context: Option<Lin>,
    #[arg(short = 'C', value_name = "NUM", help = "Output NUM lines of copied context")]
    context_lines: Option<Lin>,
    #[arg(
        short = 'u',
        long = "unified",
        value_name = "NUM",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "3",
        help = "Output NUM (default 3) lines of unified context"
    )]
    unified: Option<Lin>,
    #[arg(short = 'U', value_name = "NUM", help = "Output NUM lines of unified context")]
    unified_lines: Option<Lin>,
    #[arg(short = 'e', long, help = "Output an ed script")]
    ed: bool,
    #[arg(short = 'f', long = "forward-ed", help = "Output something like an ed script in forward order")]
    forward_ed: bool,
    #[arg(short = 'n', long, help = "Output an RCS format diff")]
    rcs: bool,
    #[arg(short = 'y', long = "side-by-side", help = "Output in two columns")]
    side_by_side: bool,

    #[arg(short = 'W', long, value_name = "NUM", default_value_t = DEFAULT_WIDTH, help = "Output at most NUM print columns")]
    width: usize,
    #[arg(long = "left-column", help = "Output only the left column of common lines")]
    left_column: bool,
    #[arg(long = "suppress-common-lines", help = "Do not output common lines")]
    suppress_common_lines: bool,
    #[arg(long, help = "Continue long lines on extra rows instead of truncating them")]
    wrap: bool,

    #[arg(short = 'p', long = "show-c-function", help = "Show which C function each change is in")]
    show_c_function: bool,
    #[arg(short = 'F', long = "show-function-line", value_name = "RE", help = "Show the most recent line matching RE")]
    show_function_line: Vec<String>,
    #[arg(short = 'L', long, value_name = "LABEL", help = "Use LABEL instead of file name and timestamp")]
    label: Vec<String>,

    #[arg(short = 'i', long = "ignore-case", help = "Ignore case differences in file contents")]
    ignore_case: bool,
    #[arg(short = 'E', long = "ignore-tab-expansion", help = "Ignore changes due to tab expansion")]
    ignore_tab_expansion: bool,
    #[arg(short = 'Z', long = "ignore-trailing-space", help = "Ignore white space at line end")]
    ignore_trailing_space: bool,
    #[arg(short = 'b', long = "ignore-space-change", help = "Ignore changes in the amount of white space")]
    ignore_space_change: bool,
    #[arg(short = 'w', long = "ignore-all-space", help = "Ignore all white space")]
    ignore_all_space: bool,
    #[arg(short = 'B', long = "ignore-blank-lines", help = "Ignore changes where lines are all blank")]
    ignore_blank_lines: bool,
    #[arg(short = 'I', long = "ignore-matching-lines", value_name = "RE", help = "Ignore changes where all lines match RE")]
    ignore_matching_lines: Vec<String>,

    #[arg(short = 'a', long, help = "Treat all files as text")]
    text: bool,
    #[arg(long = "strip-trailing-cr", help = "Strip trailing carriage return on input")]
    strip_trailing_cr: bool,
    #[arg(short = 'd', long, help = "Try hard to find a smaller set of changes")]
    minimal: bool,
    #[arg(long = "horizon-lines", value_name = "NUM", default_value_t = 0, help = "Keep NUM lines of the common prefix and suffix")]
    horizon_lines: Lin,
    #[arg(long = "speed-large-files", help = "Assume large files and many scattered small changes")]
    speed_large_files: bool,

    #[arg(short = 't', long = "expand-tabs", help = "Expand tabs to spaces in output")]
    expand_tabs: bool,
    #[arg(short = 'T', long = "initial-tab", help = "Make tabs line up by prepending a tab")]
    initial_tab: bool,
    #[arg(long, value_name = "NUM", default_value_t = 8, help = "Tab stops every NUM print columns")]
    tabsize: usize,
    #[arg(long = "suppress-blank-empty", help = "Suppress space or tab before empty output lines")]
    suppress_blank_empty: bool,
    #[arg(short = 'l', long, help = "Pass output through a pager")]
    paginate: bool,

    #[arg(short = 'q', long, help = "Report only when files differ")]
    brief: bool,
    #[arg(short = 's', long = "report-identical-files", help = "Report when two files are the same")]
    report_identical_files: bool,
    #[arg(short = 'r', long, help = "Recursively compare any subdirectories found")]
    recursive: bool,
    #[arg(short = 'N', long = "new-file", help = "Treat absent files as empty")]
    new_file: bool,

    #[arg(
        long,
        value_enum,
        value_name = "WHEN",
        num_args = 0..=1,
        require_equals = true,
        default_value = "never",
        default_missing_value = "auto",
        help = "Color output (never, auto or always)"
    )]
    color: ColorMode,
    #[arg(long, value_name = "PALETTE", help = "Colors to use when --color is active")]
    palette: Option<String>,

    #[arg(index = 1, value_name = "FILE1")]
    file1: PathBuf,
    #[arg(index = 2, value_name = "FILE2")]
    file2: PathBuf,
}

impl Cli {
    fn output_style(&self) -> Result<OutputStyle> {
        let selected = [
            (self.normal, OutputStyle::Normal),
            (self.context.is_some() || self.context_lines.is_some(), OutputStyle::Context),
            (self.unified.is_some() || self.unified_lines.is_some(), OutputStyle::Unified),
            (self.ed, OutputStyle::Ed),
            (self.forward_ed, OutputStyle::ForwardEd),
            (self.rcs, OutputStyle::Rcs),
            (self.side_by_side, OutputStyle::SideBySide),
        ];

        let mut styles = selected.iter().filter(|(on, _)| *on).map(|&(_, style)| style);
        match (styles.next(), styles.next()) {
            (None, _) => Ok(OutputStyle::Normal),
            (Some(style), None) => Ok(style),
            (Some(_), Some(_)) => anyhow::bail!("conflicting output style options"),
        }
    }

    fn white_space(&self) -> WhiteSpace {
        [
            (self.ignore_tab_expansion, WhiteSpace::TabExpansion),
            (self.ignore_trailing_space, WhiteSpace::TrailingSpace),
            (self.ignore_space_change, WhiteSpace::SpaceChange),
            (self.ignore_all_space, WhiteSpace::AllSpace),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(WhiteSpace::Significant, |acc, (_, mode)| acc.with(mode))
    }

    fn into_options(self, switch_string: String) -> Result<(DiffOptions, [PathBuf; 2])> {
        let output_style = self.output_style()?;
        let context = match output_style {
            OutputStyle::Context => self.context_lines.or(self.context),
            OutputStyle::Unified => self.unified_lines.or(self.unified),
            _ => None,
        }
        .unwrap_or(0);

        if self.label.len() > 2 {
            anyhow::bail!("too many file label options");
        }
        let mut labels = self.label.iter().cloned().map(Some);
        let labels = [labels.next().flatten(), labels.next().flatten()];

        let mut function_patterns = self.show_function_line.clone();
        if self.show_c_function {
            function_patterns.push(C_FUNCTION_PATTERN.to_string());
        }

        let options = DiffOptions {
            output_style,
            context,
            ignore_case: self.ignore_case,
            white_space: self.white_space(),
            ignore_blank_lines: self.ignore_blank_lines,
            ignore_regex: DiffOptions::compile_patterns(&self.ignore_matching_lines)?,
            function_regex: DiffOptions::compile_patterns(&function_patterns)?,
            text: self.text,
            strip_trailing_cr: self.strip_trailing_cr,
            minimal: self.minimal,
            speed_large_files: self.speed_large_files,
            horizon_lines: self.horizon_lines,
            expand_tabs: self.expand_tabs,
            initial_tab: self.initial_tab,
            suppress_blank_empty: self.suppress_blank_empty,
            tab_size: self.tabsize,
            width: self.width,
            left_column: self.left_column,
            suppress_common_lines: self.suppress_common_lines,
            wrap: self.wrap,
            color: self.color,
            palette: self.palette.as_deref().map(Palette::parse).transpose()?.unwrap_or_default(),
            labels,
            brief: self.brief,
            report_identical_files: self.report_identical_files,
            recursive: self.recursive,
            new_file: self.new_file,
            paginate: self.paginate,
            switch_string,
        };
        options.validate()?;

        Ok((options, [self.file1, self.file2]))
    }
}

/// The options as typed, for the `diff ...` line of directory runs: every
/// argument except the two operands, each preceded by a space.
fn switch_string(args: &[OsString], operands: [&PathBuf; 2]) -> String {
    let mut args = args.to_vec();
    for operand in operands.iter().rev() {
        if let Some(pos) = args.iter().rposition(|arg| arg == operand.as_os_str()) {
            args.remove(pos);
        }
    }

    args.iter()
        .map(|arg| format!(" {}", arg.to_string_lossy()))
        .collect()
}

fn colors_enabled(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Never => false,
        ColorMode::Always => true,
        ColorMode::Auto => {
            io::stdout().is_terminal()
                && std::env::var_os("TERM").is_none_or(|term| term != "dumb")
                && colored::control::ShouldColorize::from_env().should_colorize()
        }
    }
}

fn run(cli: Cli) -> Result<Verdict> {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let switches = switch_string(&args, [&cli.file1, &cli.file2]);
    let (options, [file1, file2]) = cli.into_options(switches)?;

    let colors = colors_enabled(options.color);
    let paginate = options.paginate && io::stdout().is_terminal() && std::env::var_os("NO_PAGER").is_none();
    tracing::debug!(style = ?options.output_style, colors, paginate, "starting comparison");

    let with_terminal = |session: Session| {
        let session = session.with_colors(colors);
        if colors { session.with_signal_handlers() } else { session }
    };

    if paginate {
        let pager = Pager::new();
        let verdict = {
            let session = with_terminal(Session::new(options, Box::new(PagerWriter::new(pager.clone()))));
            session.compare_paths(&file1, &file2)?
        };
        minus::page_all(pager)?;
        return Ok(verdict);
    }

    let session = with_terminal(Session::new(options, Box::new(BufWriter::new(io::stdout()))));
    let verdict = session.compare_paths(&file1, &file2)?;
    session.flush()?;

    Ok(verdict)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(verdict) => ExitCode::from(verdict.exit_code()),
        Err(err) => {
            report_trouble(&err);
            ExitCode::from(Verdict::Trouble.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ldiff").chain(args.iter().copied())).unwrap()
    }

    #[rstest]
    #[case(&["a", "b"], OutputStyle::Normal, 0)]
    #[case(&["-u", "a", "b"], OutputStyle::Unified, 3)]
    #[case(&["-U", "5", "a", "b"], OutputStyle::Unified, 5)]
    #[case(&["--unified=1", "a", "b"], OutputStyle::Unified, 1)]
    #[case(&["-c", "a", "b"], OutputStyle::Context, 3)]
    #[case(&["-C", "0", "a", "b"], OutputStyle::Context, 0)]
    #[case(&["-y", "a", "b"], OutputStyle::SideBySide, 0)]
    fn styles_and_context(#[case] args: &[&str], #[case] style: OutputStyle, #[case] context: Lin) {
        let (options, _) = parse(args).into_options(String::new()).unwrap();

        assert_eq!(options.output_style, style);
        assert_eq!(options.context, context);
    }

    #[test]
    fn two_styles_conflict() {
        let err = parse(&["-u", "-e", "a", "b"]).into_options(String::new()).unwrap_err();

        assert_eq!(err.to_string(), "conflicting output style options");
    }

    #[test]
    fn white_space_flags_combine() {
        assert_eq!(parse(&["-E", "-Z", "a", "b"]).white_space(), WhiteSpace::TabExpansionAndTrailingSpace);
        assert_eq!(parse(&["-b", "-w", "a", "b"]).white_space(), WhiteSpace::AllSpace);
    }

    #[test]
    fn switches_exclude_the_operands() {
        let args: Vec<OsString> = ["-r", "-u", "left", "right"].iter().map(OsString::from).collect();

        let switches = switch_string(&args, [&PathBuf::from("left"), &PathBuf::from("right")]);

        assert_eq!(switches, " -r -u");
    }
}
