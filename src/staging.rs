//! Per-instance mutable staging directory: `<root>/working/<instance-id>/`.
//!
//! Holds in-progress files under `<instance>/<hash>/<name>`. Only one live
//! instance ever writes into a given instance-scoped subtree (the instance
//! id is freshly generated at construction), so no cross-instance
//! coordination is required here — unlike [`crate::promoted::PromotedStore`],
//! which is shared across processes.

use std::fs::OpenOptions;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::chunk::Chunk;
use crate::error::Result;
use crate::fsutil;
use crate::instance::InstanceId;

pub struct StagingStore {
    working_root: PathBuf,
    fsync: bool,
}

impl StagingStore {
    /// Creates `<root>/working/<instance_id>/`, first removing any
    /// pre-existing directory at that path (defensive: collisions are
    /// astronomically unlikely, but a clean start is cheap to guarantee).
    pub fn new(root: &Path, instance_id: &InstanceId, fsync: bool) -> Result<Self> {
        let common = root.join("working");
        fsutil::ensure_dir(&common)?;

        let working_root = common.join(instance_id.as_str());
        if working_root.exists() {
            std::fs::remove_dir_all(&working_root)?;
        }
        fsutil::ensure_dir(&working_root)?;

        Ok(Self {
            working_root,
            fsync,
        })
    }

    /// Directory holding all staged files for `hash` under this instance.
    pub fn slot_dir(&self, hash: &str) -> PathBuf {
        self.working_root.join(hash)
    }

    /// Path of the staged file `name` for `hash`, used for validation and
    /// promotion.
    pub fn staged_path(&self, hash: &str, name: &str) -> PathBuf {
        self.slot_dir(hash).join(name)
    }

    /// Writes `chunk` into `<instance>/<hash>/<chunk.filename>`, creating
    /// parent directories and the file as needed, preserving any existing
    /// contents outside the written range.
    pub fn write_chunk(&self, hash: &str, chunk: &mut Chunk<'_>) -> Result<()> {
        let slot_dir = self.slot_dir(hash);
        fsutil::ensure_dir(&slot_dir)?;

        let path = slot_dir.join(&chunk.filename);
        let is_new = !path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;
        if is_new {
            fsutil::set_mode(&path)?;
        }

        use std::io::{Seek, SeekFrom, Write};
        file.seek(SeekFrom::Start(chunk.offset))?;

        let mut remaining = chunk.size;
        let mut buf = [0u8; 64 * 1024];
        while remaining > 0 {
            let want = remaining.min(buf.len() as u64) as usize;
            let read = chunk.source.read(&mut buf[..want])?;
            if read == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "chunk source ended before declared size was reached",
                )
                .into());
            }
            file.write_all(&buf[..read])?;
            remaining -= read as u64;
        }

        if self.fsync {
            file.sync_all()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, StagingStore) {
        let tmp = tempfile::tempdir().unwrap();
        let instance = InstanceId::generate();
        let store = StagingStore::new(tmp.path(), &instance, false).unwrap();
        (tmp, store)
    }

    #[test]
    fn write_chunk_creates_and_fills_file() {
        let (_tmp, store) = store();
        let mut data: &[u8] = b"hello";
        let mut chunk = Chunk {
            filename: "file".into(),
            offset: 0,
            size: 5,
            file_size: 5,
            source: &mut data,
        };
        store.write_chunk("abc", &mut chunk).unwrap();

        let contents = std::fs::read(store.staged_path("abc", "file")).unwrap();
        assert_eq!(contents, b"hello");
    }

    #[test]
    fn out_of_order_chunks_assemble_correctly() {
        let (_tmp, store) = store();

        let mut second: &[u8] = b"fghij";
        let mut chunk2 = Chunk {
            filename: "file".into(),
            offset: 5,
            size: 5,
            file_size: 10,
            source: &mut second,
        };
        store.write_chunk("h", &mut chunk2).unwrap();

        let mut first: &[u8] = b"abcde";
        let mut chunk1 = Chunk {
            filename: "file".into(),
            offset: 0,
            size: 5,
            file_size: 10,
            source: &mut first,
        };
        store.write_chunk("h", &mut chunk1).unwrap();

        let contents = std::fs::read(store.staged_path("h", "file")).unwrap();
        assert_eq!(contents, b"abcdefghij");
    }

    #[test]
    fn overlapping_write_replaces_bytes() {
        let (_tmp, store) = store();

        let mut first: &[u8] = b"AAAAAAA";
        let mut chunk1 = Chunk {
            filename: "file".into(),
            offset: 0,
            size: 7,
            file_size: 10,
            source: &mut first,
        };
        store.write_chunk("h", &mut chunk1).unwrap();

        let mut second: &[u8] = b"BBBBBBB";
        let mut chunk2 = Chunk {
            filename: "file".into(),
            offset: 3,
            size: 7,
            file_size: 10,
            source: &mut second,
        };
        store.write_chunk("h", &mut chunk2).unwrap();

        let contents = std::fs::read(store.staged_path("h", "file")).unwrap();
        assert_eq!(contents, b"AAABBBBBBB");
    }

    #[test]
    fn fresh_instance_purges_stale_working_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let instance = InstanceId::generate();
        let store = StagingStore::new(tmp.path(), &instance, false).unwrap();
        let leftover = store.slot_dir("stale-hash");
        fsutil::ensure_dir(&leftover).unwrap();
        assert!(leftover.exists());

        let store2 = StagingStore::new(tmp.path(), &instance, false).unwrap();
        assert!(!store2.slot_dir("stale-hash").exists());
    }
}
