//! Small filesystem helpers shared by [`crate::staging`], [`crate::promoted`]
//! and [`crate::legacy`].
//!
//! Every directory and file created by this crate gets its mode set
//! explicitly, overriding the process umask — the same reason
//! `pbs-datastore::chunk_store::ChunkStore::create` sets modes via
//! `CreateOptions` instead of trusting umask defaults.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::Result;

/// Owner rwx, group rwx, other r — used for both directories and files per
/// the artifact store's filesystem layout.
pub const ARTIFACT_MODE: u32 = 0o775;

/// Creates `path` (and any missing parents) if absent, then forces
/// [`ARTIFACT_MODE`] on every directory component created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    let mut built = std::path::PathBuf::new();
    for component in path.components() {
        built.push(component);
        match fs::create_dir(&built) {
            Ok(()) => set_mode(&built)?,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Forces [`ARTIFACT_MODE`] on an existing file or directory.
pub fn set_mode(path: &Path) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(ARTIFACT_MODE))?;
    Ok(())
}
