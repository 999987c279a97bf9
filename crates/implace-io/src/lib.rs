//! implace-io - File I/O for the place deduplication pipeline
//!
//! This crate reads the pipeline's inputs and writes its outputs:
//!
//! - **Raw JSON**: the accumulated search API results, an array of entries
//! - **Canonical CSV**: `Name,type,ratings,latitude,longitude,place_id`
//! - **Audit CSV**: the canonical layout with `# MARKER` rows per removal reason
//! - **Type tables**: type-split canonical tables and `type,count` summaries
//!
//! # Design
//!
//! All inputs implement the `RecordSource` trait and are picked by file
//! extension. Outputs are staged in a [`Publication`] and only written once
//! every table serialized, so a failed run leaves no partial files behind.

pub mod csv_reader;
pub mod csv_writer;
pub mod publish;
pub mod raw_reader;
pub mod reader;
pub mod schema;

pub use csv_reader::CanonicalCsvReader;
pub use csv_writer::{audit_table, canonical_table, type_count_table};
pub use publish::Publication;
pub use raw_reader::RawJsonReader;
pub use reader::*;
pub use schema::*;
