//! implace-core - Duplicate resolution for point-of-interest records
//!
//! Records gathered by repeated, overlapping radius searches over a city
//! contain the same venue several times: under different ids, at slightly
//! different coordinates, or with slightly different names. This crate
//! turns the raw entries into a canonical set of places.
//!
//! # Pipeline
//!
//! 1. [`loader`] validates raw entries into [`PlaceRecord`]s
//! 2. [`cluster`] drops low-confidence members of over-populated coordinate bins
//! 3. [`proximity`] resolves near-duplicates by distance and name similarity
//! 4. [`audit`] keeps every removed record together with the rule that removed it
//!
//! [`pipeline::DedupPipeline`] drives the stages in order. The crate does no
//! file I/O; see `implace-io` for readers and writers.

pub mod audit;
pub mod cluster;
pub mod config;
pub mod error;
pub mod geo;
pub mod loader;
pub mod pipeline;
pub mod proximity;
pub mod record;
pub mod similarity;
pub mod stats;

pub use audit::{AuditLog, AuditSection, RemovalReason};
pub use cluster::{ClusterOutcome, CoordinateClusterFilter};
pub use config::{DedupConfig, HaversineMode, NameMetric, TieBreakPolicy};
pub use error::{ImplaceError, Result};
pub use loader::{LoadReport, Loader, RawPlace, SkipReason};
pub use pipeline::{DedupPipeline, RunOutcome, RunSummary};
pub use proximity::{NoProgress, ProgressObserver, ProximityOutcome, ProximitySimilarityResolver};
pub use record::PlaceRecord;
