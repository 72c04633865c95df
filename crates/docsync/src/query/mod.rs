//! Query facade.
//!
//! [`SearchManager`] hands out [`QuerySet`]s that build search requests with
//! filter/query clauses and serve the results as pages, positions, slices or
//! a [`DocumentCursor`].

mod cursor;
mod manager;
mod queryset;

pub use cursor::DocumentCursor;
pub use manager::SearchManager;
pub use queryset::{QuerySet, QueryState};
