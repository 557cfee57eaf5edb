//! Line tables and equivalence classes
//!
//! - `line_table`: splits a raw byte buffer into numbered lines
//! - `equivalence`: assigns every line a class id shared by both inputs, so
//!   the LCS engine only ever compares integers

pub mod equivalence;
pub mod line_table;
