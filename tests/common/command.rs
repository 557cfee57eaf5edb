use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn work_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Run the binary inside `dir` with a pager-free, UTC environment so
/// header timestamps are stable.
pub fn run_ldiff_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("ldiff").expect("Failed to find ldiff binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("TZ", "UTC")]);
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("Failed to run ldiff");
    String::from_utf8_lossy(&output.stdout).into_owned()
}
