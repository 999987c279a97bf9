//! Pipeline driver
//!
//! Owns the working set for the whole run and applies the stages strictly
//! in sequence: load, coordinate filter, proximity filter. Nothing is
//! published until both filters finished.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde_json::Value;

use crate::audit::{AuditLog, RemovalReason};
use crate::cluster::CoordinateClusterFilter;
use crate::config::DedupConfig;
use crate::error::{ImplaceError, Result};
use crate::loader::{parse_collection, LoadReport, Loader, SkipReason};
use crate::proximity::{ProgressObserver, ProximitySimilarityResolver};
use crate::record::PlaceRecord;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub input_entries: usize,
    pub loaded: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub surviving: usize,
    pub removed: BTreeMap<RemovalReason, usize>,
}

impl RunSummary {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn removed(&self, reason: RemovalReason) -> usize {
        self.removed.get(&reason).copied().unwrap_or(0)
    }

    pub fn removed_total(&self) -> usize {
        self.removed.values().sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input entries:  {}", self.input_entries)?;
        writeln!(f, "Skipped:        {}", self.skipped_total())?;
        for (reason, count) in &self.skipped {
            writeln!(f, "  {reason}: {count}")?;
        }
        writeln!(f, "Loaded:         {}", self.loaded)?;
        for reason in RemovalReason::ALL {
            writeln!(f, "Removed {:<20} {}", format!("{reason}:"), self.removed(reason))?;
        }
        write!(f, "Surviving:      {}", self.surviving)
    }
}

/// Everything a run produces
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Canonical records in post-filter order
    pub records: Vec<PlaceRecord>,
    pub audit: AuditLog,
    pub summary: RunSummary,
}

#[derive(Debug, Clone)]
pub struct DedupPipeline {
    loader: Loader,
    cluster: CoordinateClusterFilter,
    proximity: ProximitySimilarityResolver,
}

impl Default for DedupPipeline {
    fn default() -> Self {
        Self {
            loader: Loader::default(),
            cluster: CoordinateClusterFilter::default(),
            proximity: ProximitySimilarityResolver::default(),
        }
    }
}

impl DedupPipeline {
    pub fn new(config: &DedupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            loader: Loader::new(&config.loader),
            cluster: CoordinateClusterFilter::new(&config.cluster),
            proximity: ProximitySimilarityResolver::new(&config.proximity),
        })
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Run on a raw JSON document (an array of discovered-place entries)
    pub fn run_json(&self, input: &str, progress: &mut dyn ProgressObserver) -> Result<RunOutcome> {
        let entries = parse_collection(input)?;
        self.run_entries(&entries, progress)
    }

    /// Run on already-parsed raw entries
    pub fn run_entries(
        &self,
        entries: &[Value],
        progress: &mut dyn ProgressObserver,
    ) -> Result<RunOutcome> {
        let mut seen_ids = HashSet::new();
        let (records, report) = self.loader.load(entries, &mut seen_ids);
        self.run_records(records, report, progress)
    }

    /// Run both filters over validated records
    ///
    /// `report` describes how the records were loaded and is carried into
    /// the summary. Record ids must be unique.
    pub fn run_records(
        &self,
        records: Vec<PlaceRecord>,
        report: LoadReport,
        progress: &mut dyn ProgressObserver,
    ) -> Result<RunOutcome> {
        ensure_unique_ids(&records)?;

        if records.is_empty() {
            tracing::warn!("No records to filter");
        }

        let mut audit = AuditLog::new();
        let records = self.cluster.run(records, &mut audit);
        let records = self.proximity.run(records, &mut audit, progress);

        let summary = RunSummary {
            input_entries: report.entries_seen,
            loaded: report.loaded,
            skipped: report.skipped,
            surviving: records.len(),
            removed: RemovalReason::ALL
                .into_iter()
                .map(|reason| (reason, audit.count(reason)))
                .collect(),
        };

        tracing::info!(
            "Kept {} of {} records ({} removed)",
            summary.surviving,
            summary.loaded,
            summary.removed_total()
        );

        Ok(RunOutcome {
            records,
            audit,
            summary,
        })
    }
}

fn ensure_unique_ids(records: &[PlaceRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(ImplaceError::DuplicateId(record.id().to_string()));
        }
    }
    Ok(())
}
