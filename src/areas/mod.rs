//! Stateful collaborators of a comparison run
//!
//! This module contains the pieces that carry state across comparisons:
//!
//! - `session`: Options, output sink and color state of one run
//! - `signals`: Deferred handling of terminating and stop signals
//! - `workspace`: File system and standard input access

pub mod session;
pub mod signals;
pub mod workspace;
