//! In-process configuration for [`crate::manager::ArtifactManager`].
//!
//! CLI parsing and file-based configuration are out of scope for this
//! crate (spec §1) — there is no config-file loader here, only a plain
//! builder the embedding application populates however it likes. This
//! mirrors `DatastoreTuning` in `pbs-datastore`, minus anything that would
//! require a section-config parser.

use std::path::PathBuf;

/// Root directory layout and tuning knobs for an [`ArtifactManager`](crate::manager::ArtifactManager).
#[derive(Clone, Debug)]
pub struct ArtifactManagerConfig {
    /// Root of the content-addressed store. Contains `working/<instance>/`
    /// (staging) and `<hash>/` (promoted) subtrees, which must live on the
    /// same filesystem for promotion renames to be atomic.
    pub root: PathBuf,
    /// Root of the legacy named-upload-directory adapter (spec §4.7). May
    /// be the same filesystem as `root`, but is an entirely separate
    /// namespace.
    pub legacy_root: PathBuf,
    /// Whether to `fsync` a staged file after each chunk write. Off by
    /// default, matching `DatastoreFSyncLevel::None` in `pbs-datastore` —
    /// durability of in-progress uploads is not a correctness requirement
    /// here, since an interrupted chunk simply isn't reflected in the
    /// `IntervalSet` and the upload converges on retry.
    pub staging_fsync: bool,
}

impl ArtifactManagerConfig {
    pub fn new(root: impl Into<PathBuf>, legacy_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            legacy_root: legacy_root.into(),
            staging_fsync: false,
        }
    }

    pub fn with_staging_fsync(mut self, enabled: bool) -> Self {
        self.staging_fsync = enabled;
        self
    }
}
