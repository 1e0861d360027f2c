//! Geofenced, deduplicated candidate set for one run.

use std::collections::BTreeMap;

use mplscoffee_core::{BoundingBox, Candidate};

/// What happened when a candidate was offered to the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Inserted,
    /// Same `place_id` already admitted; the earlier copy is kept.
    Duplicate,
    OutOfBounds,
}

/// Unique in-bounds candidates keyed by `place_id`.
///
/// Overlapping search radii return the same place from several seeds, so
/// the set is the only place a candidate's identity is decided.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    bounds: BoundingBox,
    entries: BTreeMap<String, Candidate>,
}

impl CandidateSet {
    #[must_use]
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            entries: BTreeMap::new(),
        }
    }

    /// Admits `candidate` if it lies inside the bounds and is not already
    /// present.
    pub fn offer(&mut self, candidate: Candidate) -> Admission {
        if !self.bounds.contains(candidate.location) {
            return Admission::OutOfBounds;
        }
        if self.entries.contains_key(&candidate.place_id) {
            return Admission::Duplicate;
        }
        self.entries.insert(candidate.place_id.clone(), candidate);
        Admission::Inserted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, place_id: &str) -> bool {
        self.entries.contains_key(place_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.values()
    }

    #[must_use]
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.entries.into_values().collect()
    }
}
