//! Content-addressed chunked upload manager.
//!
//! Clients upload a file as an arbitrary sequence of byte-range chunks,
//! possibly concurrently and out of order. The manager assembles each file
//! in a private staging area, verifies its declared content hash, and
//! atomically promotes it into a content-addressed store keyed by that
//! hash.
//!
//! # Data formats
//!
//! An artifact is identified by the lowercase hex SHA-256 digest of its
//! complete byte content (its "checksum"). The checksum is a promise made
//! by the uploader: it is verified against the assembled bytes before
//! promotion, never trusted blindly.
//!
//! Chunks may arrive out of order, overlapping, or repeated. An
//! [`interval_set::IntervalSet`] tracks which byte ranges of a given
//! artifact have been written so far, so the manager can recognize
//! completion cheaply without re-reading the file after every chunk.
//!
//! # Concurrency
//!
//! Every hash gets its own readers-writer lock ([`lock_registry`]),
//! created lazily. Ordinary chunk writes take the read side (so unlimited
//! chunks of one artifact progress in parallel); validating the checksum
//! and promoting the file takes the write side, excluding new chunk writes
//! for the duration. Locks never span two hashes, so cross-hash deadlock
//! cannot occur.
//!
//! # Promotion
//!
//! Promotion is a single `rename(2)` from the staging directory to the
//! promoted (content-addressed) directory. Existence of the promoted
//! directory is the sole authority for "this hash is available" and is
//! checked with a plain `stat`, never by reading staging state.

pub mod chunk;
pub mod config;
pub mod error;
pub mod extract;
mod fsutil;
pub mod instance;
pub mod interval_set;
pub mod legacy;
pub mod lock_registry;
pub mod manager;
pub mod promoted;
pub mod staging;

pub use chunk::Chunk;
pub use config::ArtifactManagerConfig;
pub use error::ArtifactError;
pub use manager::ArtifactManager;
