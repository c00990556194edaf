//! Typed errors for the artifact store.

/// Error kinds surfaced by the public API.
///
/// `BadRequest` and `Conflict` are meant to be shown to the caller verbatim.
/// Hash mismatches are deliberately *not* represented here — they are a
/// recoverable state handled internally by [`crate::manager::ArtifactManager`]
/// (the artifact just never appears in the promoted store).
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    /// The caller supplied invalid chunk geometry or an invalid request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No such artifact.
    #[error("not found: {0}")]
    NotFound(String),

    /// The artifact already exists in the promoted store and cannot accept
    /// further chunks.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An [`interval_set::IntervalSet`](crate::interval_set) update was
    /// given a range that cannot possibly apply to the file.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Filesystem or stream failure.
    #[error("{0}")]
    Io(#[from] anyhow::Error),
}

impl From<std::io::Error> for ArtifactError {
    fn from(err: std::io::Error) -> Self {
        ArtifactError::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ArtifactError>;
