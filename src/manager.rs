//! Orchestrates chunk write -> interval update -> validate -> atomic
//! promote. This is the only public entry point clients should drive for
//! new uploads; [`crate::legacy`] offers the deprecated, unlocked
//! named-directory surface separately.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::chunk::Chunk;
use crate::config::ArtifactManagerConfig;
use crate::error::{ArtifactError, Result};
use crate::instance::InstanceId;
use crate::interval_set::IntervalSet;
use crate::legacy::LegacyStore;
use crate::lock_registry::ArtifactLockRegistry;
use crate::promoted::PromotedStore;
use crate::staging::StagingStore;

pub struct ArtifactManager {
    staging: StagingStore,
    promoted: PromotedStore,
    legacy: LegacyStore,
    locks: ArtifactLockRegistry,
    interval_sets: Mutex<HashMap<String, Arc<IntervalSet>>>,
}

impl ArtifactManager {
    pub fn new(config: ArtifactManagerConfig) -> Result<Self> {
        let instance_id = InstanceId::generate();
        let staging = StagingStore::new(&config.root, &instance_id, config.staging_fsync)?;
        let promoted = PromotedStore::new(&config.root)?;
        let legacy = LegacyStore::new(&config.legacy_root);

        log::info!("artifact manager starting with instance id {instance_id}");

        Ok(Self {
            staging,
            promoted,
            legacy,
            locks: ArtifactLockRegistry::new(),
            interval_sets: Mutex::new(HashMap::new()),
        })
    }

    /// Access to the deprecated named-directory upload API (spec §4.7).
    /// Entirely separate namespace from the content-addressed store above:
    /// no checksum, no locking, no interval tracking.
    pub fn legacy(&self) -> &LegacyStore {
        &self.legacy
    }

    fn interval_set(&self, hash: &str, file_size: u64) -> Arc<IntervalSet> {
        let mut sets = self.interval_sets.lock();
        sets.entry(hash.to_string())
            .or_insert_with(|| Arc::new(IntervalSet::new(file_size)))
            .clone()
    }

    /// Accepts one chunk of an artifact upload.
    ///
    /// Returns `Ok(())` whether or not this call happened to complete the
    /// artifact and trigger promotion — promotion is an internal side
    /// effect, not something the caller waits on synchronously beyond this
    /// call returning (it *does* run synchronously within this call when
    /// triggered, but callers should not assume every `Ok` means "now
    /// promoted"; use [`Self::stat_artifact`] to confirm).
    pub fn update_artifact(&self, hash: &str, mut chunk: Chunk<'_>) -> Result<()> {
        chunk.validate()?;

        let file_size = chunk.file_size;
        let offset = chunk.offset;
        let end = offset + chunk.size;
        let filename = chunk.filename.clone();

        let is_complete = {
            let _read_guard = self.locks.read(hash);

            if self.promoted.exists(hash) {
                return Err(ArtifactError::Conflict(format!(
                    "user artifact (checksum: {hash:?}) already exists"
                )));
            }

            self.staging.write_chunk(hash, &mut chunk)?;

            let intervals = self.interval_set(hash, file_size);
            // A zero-size chunk (offset == end) is valid input (spec.md §3,
            // "chunk size (>=0)") but carries no bytes to record: skip the
            // IntervalSet update rather than let it reject start == end.
            if offset != end {
                intervals.update(offset, end)?;
            }
            intervals.is_complete()
        };

        if is_complete {
            self.promote_if_ready(hash, &filename, file_size)?;
        }

        Ok(())
    }

    /// Validates the checksum of a fully-written staged artifact and
    /// promotes it if it matches. Idempotent: a second call after
    /// promotion (by this or another racing caller) is a no-op.
    fn promote_if_ready(&self, hash: &str, filename: &str, file_size: u64) -> Result<()> {
        let _write_guard = self.locks.write(hash);

        if self.promoted.exists(hash) {
            return Ok(());
        }

        let staged_path = self.staging.staged_path(hash, filename);

        let mut file = match File::open(&staged_path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        let actual_size = file.metadata()?.len();
        if actual_size != file_size {
            // IntervalSet guarantees this can't happen in practice (it
            // only reports complete once every byte up to file_size has
            // been written), but re-check defensively: a shrinking
            // declared size racing completion should never reach here.
            log::debug!(
                "staged size {actual_size} does not match declared size {file_size} for {hash}, deferring promotion"
            );
            return Ok(());
        }

        let mut hasher = openssl::sha::Sha256::new();
        let mut buf = [0u8; 64 * 1024];
        loop {
            let read = file.read(&mut buf)?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
        }
        let digest = hex::encode(hasher.finish());

        if digest != hash {
            // Hash mismatch is recoverable, not an error: the client is
            // expected to re-upload corrected chunks. Staging and the
            // IntervalSet are left untouched so a later UpdateArtifact
            // call that flips any byte triggers another promotion
            // attempt.
            log::warn!(
                "checksum mismatch for artifact {hash}: staged content hashes to {digest}"
            );
            return Ok(());
        }

        let slot_dir = self.staging.slot_dir(hash);
        self.promoted.promote(&slot_dir, hash)?;
        self.interval_sets.lock().remove(hash);

        log::info!("promoted artifact {hash}");

        Ok(())
    }

    /// Returns `Ok(())` iff `<promoted>/<hash>/` exists; never consults
    /// staging state.
    pub fn stat_artifact(&self, hash: &str) -> Result<()> {
        if self.promoted.exists(hash) {
            Ok(())
        } else {
            Err(ArtifactError::NotFound(format!(
                "user artifact (checksum: {hash:?}) not found"
            )))
        }
    }
}
