//! Comparison data model and algorithms
//!
//! This module contains the types and algorithms behind a comparison:
//!
//! - `color`: Color palette parsing and color contexts
//! - `core`: Shared utilities (error type, pager wrapper)
//! - `diff`: The LCS engine, edit scripts, hunks and triviality analysis
//! - `format`: Renderers for every output style
//! - `lines`: Line tables and the equivalence classifier
//! - `options`: The validated option set driving a comparison
//!
//! Data flows leaf-first: `lines` → `diff` → `format`.

pub mod color;
pub mod core;
pub mod diff;
pub mod format;
pub mod lines;
pub mod options;
