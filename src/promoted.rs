//! Shared immutable content-addressed directory: `<root>/<hash>/`.
//!
//! The only mutating operation the manager ever performs here is a single
//! atomic `rename` from a staging slot. Existence of `<root>/<hash>/` is
//! the authoritative signal that the hash is available; nothing else
//! (size, partial reads, staging state) is consulted.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fsutil;

pub struct PromotedStore {
    root: PathBuf,
}

impl PromotedStore {
    pub fn new(root: &Path) -> Result<Self> {
        fsutil::ensure_dir(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn slot_dir(&self, hash: &str) -> PathBuf {
        self.root.join(hash)
    }

    pub fn exists(&self, hash: &str) -> bool {
        self.slot_dir(hash).is_dir()
    }

    /// Atomically moves `staging_dir` into place as `<root>/<hash>/`.
    /// `staging_dir` and the promoted root must live on the same
    /// filesystem for this to be atomic (see spec Design Notes).
    pub fn promote(&self, staging_dir: &Path, hash: &str) -> Result<()> {
        std::fs::rename(staging_dir, self.slot_dir(hash))?;
        Ok(())
    }
}
