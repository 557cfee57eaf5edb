use crate::common::command::{run_ldiff_command, work_dir};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use rstest::rstest;
use std::path::Path;

mod common;

fn write_pair(dir: &Path, a: &str, b: &str) {
    write_file(FileSpec::new(dir.join("a.txt"), a.to_string()));
    write_file(FileSpec::new(dir.join("b.txt"), b.to_string()));
}

#[rstest]
#[case::case("-i", "Hello World\n", "hELLO wORLD\n")]
#[case::all_space("-w", "a b\tc\n", "abc\n")]
#[case::space_change("-b", "a  b \n", "a\tb\n")]
#[case::blank_lines("-B", "a\n\n\nb\n", "a\nb\n")]
#[case::trailing_cr("--strip-trailing-cr", "a\r\nb\r\n", "a\nb\n")]
#[case::tab_expansion("-E", "\tx\n", "        x\n")]
#[case::trailing_space("-Z", "x \t\n", "x\n")]
fn ignored_differences_leave_files_identical(
    work_dir: TempDir,
    #[case] switch: &str,
    #[case] a: &str,
    #[case] b: &str,
) {
    write_pair(work_dir.path(), a, b);

    run_ldiff_command(work_dir.path(), &["a.txt", "b.txt"])
        .assert()
        .code(1);
    run_ldiff_command(work_dir.path(), &[switch, "a.txt", "b.txt"])
        .assert()
        .success()
        .stdout("");
}

#[rstest]
fn matching_lines_are_ignored(work_dir: TempDir) {
    write_pair(work_dir.path(), "a\n# one\nb\n", "a\n# two\nb\n");

    run_ldiff_command(work_dir.path(), &["-I", "^#", "a.txt", "b.txt"])
        .assert()
        .success()
        .stdout("");
}

#[rstest]
fn hunks_with_real_changes_are_printed_whole(work_dir: TempDir) {
    write_pair(work_dir.path(), "a\n# one\nb\n", "a\n# two\nc\n");

    run_ldiff_command(work_dir.path(), &["-I", "^#", "a.txt", "b.txt"])
        .assert()
        .code(1)
        .stdout("2,3c2,3\n< # one\n< b\n---\n> # two\n> c\n");
}

#[rstest]
fn several_patterns_combine(work_dir: TempDir) {
    write_pair(work_dir.path(), "a\n# one\n// x\n", "a\n# two\n// y\n");

    run_ldiff_command(work_dir.path(), &["-I", "^#", "-I", "^//", "a.txt", "b.txt"])
        .assert()
        .success();
}

#[rstest]
fn white_space_is_significant_by_default(work_dir: TempDir) {
    write_pair(work_dir.path(), "a b\n", "a  b\n");

    run_ldiff_command(work_dir.path(), &["a.txt", "b.txt"])
        .assert()
        .code(1)
        .stdout("1c1\n< a b\n---\n> a  b\n");
}

#[rstest]
#[case::trailing_space("-Z")]
#[case::space_change("-b")]
#[case::all_space("-w")]
fn missing_final_newline_counts_as_trailing_space(work_dir: TempDir, #[case] switch: &str) {
    write_pair(work_dir.path(), "a\nx", "a\nx\n");

    run_ldiff_command(work_dir.path(), &["a.txt", "b.txt"])
        .assert()
        .code(1);
    run_ldiff_command(work_dir.path(), &[switch, "-u", "a.txt", "b.txt"])
        .assert()
        .success()
        .stdout("");
}
