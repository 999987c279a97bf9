//! Removed-record audit log
//!
//! Every record a filter removes is moved here together with the rule that
//! removed it. Records are grouped into sections by reason, in the order the
//! stages ran, and within a section in the order they were removed.

use std::fmt;

use crate::record::PlaceRecord;

/// The rule that removed a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemovalReason {
    /// Low-confidence member of an over-populated coordinate bin
    CoordDuplicate,
    /// Losing side of a close, similarly named pair
    ProximityDuplicate,
}

impl RemovalReason {
    pub const ALL: [RemovalReason; 2] = [
        RemovalReason::CoordDuplicate,
        RemovalReason::ProximityDuplicate,
    ];

    /// Section marker as written to the audit table
    pub fn marker(&self) -> &'static str {
        match self {
            RemovalReason::CoordDuplicate => "COORD_DUPLICATE",
            RemovalReason::ProximityDuplicate => "PROXIMITY_DUPLICATE",
        }
    }

    /// `# MARKER` header row text
    pub fn header(&self) -> String {
        format!("# {}", self.marker())
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        let marker = marker.trim().trim_start_matches('#').trim();
        Self::ALL.into_iter().find(|r| r.marker() == marker)
    }
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Records removed by one stage
#[derive(Debug, Clone, PartialEq)]
pub struct AuditSection {
    pub reason: RemovalReason,
    pub records: Vec<PlaceRecord>,
}

/// Append-only log of removed records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLog {
    sections: Vec<AuditSection>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a section for `reason`, even if it ends up empty
    ///
    /// A stage opens its section before removing anything so the audit table
    /// shows every stage that ran.
    pub fn open_section(&mut self, reason: RemovalReason) {
        let already_open = self.sections.last().map(|s| s.reason) == Some(reason);
        if !already_open {
            self.sections.push(AuditSection {
                reason,
                records: Vec::new(),
            });
        }
    }

    /// Append a removed record, opening a section if the reason changed
    pub fn record(&mut self, reason: RemovalReason, record: PlaceRecord) {
        self.open_section(reason);
        if let Some(section) = self.sections.last_mut() {
            section.records.push(record);
        }
    }

    /// Append a stage's removals as one section
    pub fn extend(&mut self, reason: RemovalReason, records: impl IntoIterator<Item = PlaceRecord>) {
        self.open_section(reason);
        for record in records {
            self.record(reason, record);
        }
    }

    pub fn sections(&self) -> &[AuditSection] {
        &self.sections
    }

    /// All removed records with their reason, in emission order
    pub fn entries(&self) -> impl Iterator<Item = (RemovalReason, &PlaceRecord)> {
        self.sections
            .iter()
            .flat_map(|s| s.records.iter().map(move |r| (s.reason, r)))
    }

    pub fn count(&self, reason: RemovalReason) -> usize {
        self.sections
            .iter()
            .filter(|s| s.reason == reason)
            .map(|s| s.records.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
