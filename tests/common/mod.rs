#![allow(dead_code)]

pub mod command;
pub mod file;

/// 2024-01-02 03:04:05 UTC, stamped on files whose headers a test checks.
pub const FIXED_MTIME: i64 = 1_704_164_645;
