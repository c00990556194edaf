//! Tracks which byte ranges of a single file of known size have been
//! written, and answers "is the file fully covered?" cheaply.
//!
//! The representation is an ordered set of boundary markers `(offset,
//! covered)` alternating `covered`/`uncovered` along ascending offset. The
//! implicit tail after the last marker carries the opposite state of that
//! marker (uncovered if the set is empty). A fully covered file of size `F`
//! is represented by exactly the two markers `(0, covered)` and `(F,
//! uncovered)`.
//!
//! Boundary markers make overlap/adjacency coalescing a uniform
//! delete-then-insert on two points rather than a case analysis over
//! surrounding segments: [`IntervalSet::update`] always removes every
//! marker inside `[start, end]` and then reinserts at most one marker at
//! each of `start` and `end`, depending on what survives on either side.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::{ArtifactError, Result};

/// Sparse-interval tracker for one file of fixed size `F`.
pub struct IntervalSet {
    file_size: u64,
    markers: RwLock<BTreeMap<u64, bool>>,
}

impl IntervalSet {
    pub fn new(file_size: u64) -> Self {
        Self {
            file_size,
            markers: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Marks bytes `[start, end)` covered.
    pub fn update(&self, start: u64, end: u64) -> Result<()> {
        if !(start < end && end <= self.file_size) {
            return Err(ArtifactError::InvalidRange(format!(
                "invalid range [{start}, {end}) for file of size {}",
                self.file_size
            )));
        }

        let mut markers = self.markers.write();

        let obsolete: Vec<u64> = markers.range(start..=end).map(|(k, _)| *k).collect();
        for key in obsolete {
            markers.remove(&key);
        }

        let prev_covered = markers.range(..start).next_back().map(|(_, v)| *v);
        if prev_covered != Some(true) {
            markers.insert(start, true);
        }

        let next_covered = markers.range(end..).next().map(|(_, v)| *v);
        if next_covered != Some(false) {
            markers.insert(end, false);
        }

        Ok(())
    }

    /// Returns true iff exactly two markers exist: `(0, covered)` and
    /// `(F, uncovered)`.
    pub fn is_complete(&self) -> bool {
        let markers = self.markers.read();
        if markers.len() != 2 {
            return false;
        }
        let mut iter = markers.iter();
        let first = iter.next();
        let last = iter.next();
        first == Some((&0, &true)) && last == Some((&self.file_size, &false))
    }
}
