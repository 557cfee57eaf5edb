//! Edit scripts and the algorithms producing them
//!
//! This module turns two line tables into an ordered list of changes and
//! groups those changes for output:
//!
//! - `analysis`: The comparison pipeline (trimming, classification, search)
//! - `change`: `Change` runs, per-line change flags and the `EditScript`
//! - `discard`: Removal of lines that cannot or need not be matched
//! - `lcs`: The O(ND) middle-snake shortest edit script search
//! - `shift`: Canonical placement of change boundaries
//! - `hunk`: Grouping of changes into hunks under a context policy
//! - `triviality`: Detection of hunks made only of ignorable lines
//! - `verdict`: The identical/different/trouble outcome of a comparison

pub mod analysis;
pub mod change;
pub mod discard;
pub mod hunk;
pub mod lcs;
pub mod shift;
pub mod triviality;
pub mod verdict;
