//! Comparison operations
//!
//! Each operation is an `impl Session` block, composed from the areas and
//! artifacts modules:
//!
//! - `compare`: Command line operands and single file pairs
//! - `directories`: Directory pairs, entry by entry, optionally recursive
//!
//! Operations return the [`Verdict`](crate::artifacts::diff::verdict::Verdict)
//! of what they compared. Failures that only affect one file pair inside a
//! directory run are reported on stderr with [`report_trouble`] and become
//! a `Trouble` verdict; everything else propagates as an error.

pub mod compare;
pub mod directories;

use colored::Colorize;

/// Print a problem on stderr with the program prefix.
pub fn report_trouble(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "ldiff:".red().bold());
}
