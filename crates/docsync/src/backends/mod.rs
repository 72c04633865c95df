//! Record store and search index implementations.
//!
//! # Available Backends
//!
//! | Backend | Feature | Role |
//! |---------|---------|------|
//! | Memory | (always) | Record store and search index held in process memory |
//! | SQLite | `sqlite` | Record store over existing tables |
//! | Elasticsearch | `elasticsearch` | Search index |

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
