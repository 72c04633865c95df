//! In-memory backends.
//!
//! [`MemoryStore`] and [`MemoryIndex`] keep everything in process memory.
//! They are always available and back the test suite.

mod index;
mod matcher;
mod store;

pub use index::MemoryIndex;
pub use store::MemoryStore;
