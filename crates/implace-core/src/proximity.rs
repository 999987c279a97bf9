//! Distance plus name-similarity duplicate resolution
//!
//! Catches duplicates that do not share an exact coordinate bin: the same
//! store listed twice a few meters apart with a slightly different name.
//!
//! Every unordered pair `(i, j)`, `i < j`, is compared in working-set order.
//! A pair is a duplicate candidate when it is closer than `max_distance_km`
//! and its names are similar enough (a lower similarity is accepted inside
//! `close_distance_km`). Candidates are resolved by the first rule that
//! applies:
//!
//! 1. only the left record has a type: remove the right one
//! 2. only the right record has a type: remove the left one
//! 3. the left record has more ratings: remove the right one
//! 4. the right record has more ratings: remove the left one
//! 5. otherwise apply the [`TieBreakPolicy`]
//!
//! Once the left record is removed its outcome is decided and it is not
//! compared any further. Removed records never take part in later pairs.

use crate::audit::{AuditLog, RemovalReason};
use crate::config::{HaversineMode, ProximityConfig, TieBreakPolicy};
use crate::geo::haversine_km_with;
use crate::record::PlaceRecord;
use crate::similarity::NameMatcher;

/// Receives progress of the pairwise pass
///
/// Called once per left index with the number of left indices finished.
pub trait ProgressObserver {
    fn on_progress(&mut self, done: usize, total: usize);
}

/// Observer that ignores progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _done: usize, _total: usize) {}
}

impl<F: FnMut(usize, usize)> ProgressObserver for F {
    fn on_progress(&mut self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Which side of a candidate pair is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    RemoveLeft,
    RemoveRight,
    /// Equal type presence and equal ratings, left unresolved
    Unresolved,
}

/// Result of one pass of the resolver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityOutcome {
    /// Surviving records in their original relative order
    pub kept: Vec<PlaceRecord>,
    /// Removed records in the order they were decided
    pub removed: Vec<PlaceRecord>,
    /// Candidate pairs that no rule resolved
    pub unresolved_pairs: usize,
}

#[derive(Debug, Clone)]
pub struct ProximitySimilarityResolver {
    max_distance_km: f64,
    close_distance_km: f64,
    name_similarity: f64,
    close_name_similarity: f64,
    earth_radius_km: f64,
    haversine: HaversineMode,
    tie_break: TieBreakPolicy,
    matcher: NameMatcher,
}

impl Default for ProximitySimilarityResolver {
    fn default() -> Self {
        Self::new(&ProximityConfig::default())
    }
}

impl ProximitySimilarityResolver {
    pub fn new(config: &ProximityConfig) -> Self {
        Self {
            max_distance_km: config.max_distance_km,
            close_distance_km: config.close_distance_km,
            name_similarity: config.name_similarity,
            close_name_similarity: config.close_name_similarity,
            earth_radius_km: config.earth_radius_km,
            haversine: config.haversine,
            tie_break: config.tie_break,
            matcher: NameMatcher::new(config.name_metric, config.normalize_names),
        }
    }

    /// Great-circle distance in kilometers between two records
    pub fn distance_km(&self, a: &PlaceRecord, b: &PlaceRecord) -> f64 {
        haversine_km_with(
            a.latitude(),
            a.longitude(),
            b.latitude(),
            b.longitude(),
            self.earth_radius_km,
            self.haversine,
        )
    }

    /// Whether two records are close and similarly named enough to be one place
    pub fn is_candidate(&self, a: &PlaceRecord, b: &PlaceRecord) -> bool {
        let distance = self.distance_km(a, b);
        if !(distance < self.max_distance_km) {
            return false;
        }
        let similarity = self.matcher.score(a.name(), b.name());
        similarity >= self.name_similarity
            || (similarity >= self.close_name_similarity && distance < self.close_distance_km)
    }

    /// Apply the tie-break rules to a candidate pair
    pub fn resolve(&self, left: &PlaceRecord, right: &PlaceRecord) -> Resolution {
        match (left.has_type(), right.has_type()) {
            (true, false) => return Resolution::RemoveRight,
            (false, true) => return Resolution::RemoveLeft,
            _ => {}
        }

        if left.rating_count() > right.rating_count() {
            Resolution::RemoveRight
        } else if left.rating_count() < right.rating_count() {
            Resolution::RemoveLeft
        } else {
            match self.tie_break {
                TieBreakPolicy::KeepBoth => Resolution::Unresolved,
                TieBreakPolicy::PreferEarlier => Resolution::RemoveRight,
            }
        }
    }

    /// Split `records` into survivors and removals
    pub fn apply(
        &self,
        records: Vec<PlaceRecord>,
        progress: &mut dyn ProgressObserver,
    ) -> ProximityOutcome {
        let n = records.len();
        let mut removed = vec![false; n];
        let mut removal_order: Vec<usize> = Vec::new();
        let mut unresolved_pairs = 0;
        let total = n.saturating_sub(1);

        for i in 0..total {
            if !removed[i] {
                for j in (i + 1)..n {
                    if removed[j] || !self.is_candidate(&records[i], &records[j]) {
                        continue;
                    }

                    match self.resolve(&records[i], &records[j]) {
                        Resolution::RemoveRight => {
                            removed[j] = true;
                            removal_order.push(j);
                        }
                        Resolution::RemoveLeft => {
                            removed[i] = true;
                            removal_order.push(i);
                            break;
                        }
                        Resolution::Unresolved => unresolved_pairs += 1,
                    }
                }
            }
            progress.on_progress(i + 1, total);
        }

        let mut slots: Vec<Option<PlaceRecord>> = records.into_iter().map(Some).collect();
        let removed_records = removal_order
            .iter()
            .filter_map(|&idx| slots[idx].take())
            .collect();
        let kept = slots.into_iter().flatten().collect();

        ProximityOutcome {
            kept,
            removed: removed_records,
            unresolved_pairs,
        }
    }

    /// Apply the resolver and move removals into `audit`
    pub fn run(
        &self,
        records: Vec<PlaceRecord>,
        audit: &mut AuditLog,
        progress: &mut dyn ProgressObserver,
    ) -> Vec<PlaceRecord> {
        let before = records.len();
        let outcome = self.apply(records, progress);

        tracing::info!(
            "Proximity filter: {} > {} ({} unresolved ties)",
            before,
            outcome.kept.len(),
            outcome.unresolved_pairs
        );

        audit.extend(RemovalReason::ProximityDuplicate, outcome.removed);
        outcome.kept
    }
}
