//! Field mapping and index schema.
//!
//! - [`map_field`], [`map_record`] - record fields to document values
//! - [`index_mapping`], [`document_mappings`], [`init_mapping`] - index schema from descriptors

pub mod mapper;
pub mod schema;

pub use mapper::{map_field, map_record};
pub use schema::{IndexSettings, document_mappings, index_mapping, init_mapping};
