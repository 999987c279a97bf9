//! Coordinate-bin overcount filter
//!
//! Overlapping search circles return the same coordinate many times. Two
//! records in one bin are plausible (a shop inside a mall, say), but three
//! or more at the identical truncated coordinate are treated as sampling
//! noise: members of such a bin without a type, or with fewer than
//! `min_ratings` ratings, are removed.

use std::collections::HashMap;

use crate::audit::{AuditLog, RemovalReason};
use crate::config::ClusterConfig;
use crate::record::PlaceRecord;

/// Result of one pass of the filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterOutcome {
    /// Surviving records in their original relative order
    pub kept: Vec<PlaceRecord>,
    /// Removed records in encounter order
    pub removed: Vec<PlaceRecord>,
    /// Number of bins with more than `max_plausible_members` members
    pub candidate_clusters: usize,
}

#[derive(Debug, Clone)]
pub struct CoordinateClusterFilter {
    max_plausible_members: usize,
    min_ratings: u32,
}

impl Default for CoordinateClusterFilter {
    fn default() -> Self {
        Self::new(&ClusterConfig::default())
    }
}

impl CoordinateClusterFilter {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            max_plausible_members: config.max_plausible_members,
            min_ratings: config.min_ratings,
        }
    }

    /// Whether a member of a candidate cluster should be dropped
    pub fn is_low_confidence(&self, record: &PlaceRecord) -> bool {
        !record.has_type() || record.rating_count() < self.min_ratings
    }

    /// Split `records` into survivors and removals
    pub fn apply(&self, records: Vec<PlaceRecord>) -> ClusterOutcome {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            *counts.entry(record.coordinate_key()).or_insert(0) += 1;
        }

        let candidate_clusters = counts
            .values()
            .filter(|&&n| n > self.max_plausible_members)
            .count();

        let remove: Vec<bool> = records
            .iter()
            .map(|r| {
                counts[r.coordinate_key()] > self.max_plausible_members && self.is_low_confidence(r)
            })
            .collect();

        let mut outcome = ClusterOutcome {
            candidate_clusters,
            ..Default::default()
        };
        for (record, remove) in records.into_iter().zip(remove) {
            if remove {
                outcome.removed.push(record);
            } else {
                outcome.kept.push(record);
            }
        }
        outcome
    }

    /// Apply the filter and move removals into `audit`
    pub fn run(&self, records: Vec<PlaceRecord>, audit: &mut AuditLog) -> Vec<PlaceRecord> {
        let before = records.len();
        let outcome = self.apply(records);

        tracing::info!(
            "Coordinate filter: {} > {} ({} candidate clusters)",
            before,
            outcome.kept.len(),
            outcome.candidate_clusters
        );

        audit.extend(RemovalReason::CoordDuplicate, outcome.removed);
        outcome.kept
    }
}
