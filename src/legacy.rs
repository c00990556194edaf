//! Thin adapter reproducing the deprecated named-upload-directory API.
//!
//! Unlike [`crate::manager::ArtifactManager`], directories here are
//! freestanding: no checksum, no per-hash lock, no
//! [`IntervalSet`](crate::interval_set::IntervalSet) tracking completion.
//! Callers own sequencing of their own chunk writes. This exists only for
//! parity with callers that haven't migrated to `UpdateArtifact`; it is
//! not hardened the way the content-addressed path is.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::chunk::Chunk;
use crate::error::{ArtifactError, Result};
use crate::extract;
use crate::fsutil;

pub struct LegacyStore {
    root: PathBuf,
}

impl LegacyStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn dir_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Creates a new, empty upload directory and returns its name.
    pub fn new_dir(&self) -> Result<String> {
        fsutil::ensure_dir(&self.root)?;

        let name = proxmox_uuid::Uuid::generate().to_string();
        let dir = self.dir_path(&name);
        fsutil::ensure_dir(&dir)?;
        Ok(name)
    }

    /// Lists the names of existing upload directories. Returns an empty
    /// list if the legacy root doesn't exist yet (no directories have ever
    /// been created).
    pub fn list_dirs(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    pub fn dir_path_checked(&self, name: &str) -> Result<PathBuf> {
        let dir = self.dir_path(name);
        if !dir.is_dir() {
            return Err(ArtifactError::BadRequest(format!(
                "upload directory {name:?} does not exist"
            )));
        }
        Ok(dir)
    }

    /// Writes a chunk into `<root>/<dir>/<chunk.filename>` with no
    /// interval tracking: the caller is responsible for sequencing its own
    /// writes to a given file.
    pub fn update_artifact_with_dir(&self, dir: &str, chunk: &mut Chunk<'_>) -> Result<()> {
        let dir_path = self.dir_path_checked(dir)?;
        let file_path = dir_path.join(&chunk.filename);

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&file_path)?;
        let is_new = file.metadata()?.len() == 0 && chunk.offset == 0;
        if is_new {
            fsutil::set_mode(&file_path)?;
        }

        use std::io::{Seek, SeekFrom, Write};
        file.seek(SeekFrom::Start(chunk.offset))?;

        let mut remaining = chunk.size;
        let mut buf = [0u8; 64 * 1024];
        while remaining > 0 {
            let want = remaining.min(buf.len() as u64) as usize;
            let read = chunk.source.read(&mut buf[..want])?;
            if read == 0 {
                break;
            }
            file.write_all(&buf[..read])?;
            remaining -= read as u64;
        }

        Ok(())
    }

    /// Extracts `<root>/<dir>/<name>`, permitted unconditionally — legacy
    /// directories are never promoted, so there is no immutability to
    /// violate.
    pub fn extract_artifact_with_dir(&self, dir: &str, name: &str) -> Result<()> {
        let dir_path = self.dir_path_checked(dir)?;
        if !dir_path.join(name).is_file() {
            return Err(ArtifactError::BadRequest(format!(
                "artifact {name:?} does not exist"
            )));
        }
        extract::extract_artifact(&dir_path, name)
    }
}
