//! Test infrastructure for the synchronization engine.
//!
//! Shared fixtures (an `Article` record kind with tags) and a probe index
//! that records the calls it receives and can reject saves on demand.

#![allow(dead_code)]

pub mod fixtures;
pub mod probe;

pub use fixtures::*;
pub use probe::*;
