//! Startup seeding from a JSON array of tracks.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::db::models::NewTrack;
use crate::store::{StoreError, TrackStore};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed seed file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to store seed data: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already had tracks; the seed file was not read.
    AlreadyPopulated,
    /// The store was empty and this many tracks were inserted.
    Seeded(usize),
}

/// Read and parse a seed file.
pub fn read_seed_file(path: &Path) -> Result<Vec<NewTrack>, SeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Populate `store` from `path` unless it already holds tracks.
/// All records go in as one batch; a failure leaves the store empty.
pub fn seed_if_empty(store: &dyn TrackStore, path: &Path) -> Result<SeedOutcome, SeedError> {
    if !store.is_empty()? {
        log::debug!("Store already populated, skipping seed");
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    let tracks = read_seed_file(path)?;
    let inserted = store.insert_batch(tracks)?;
    log::info!("Seeded {} tracks from {}", inserted, path.display());
    Ok(SeedOutcome::Seeded(inserted))
}
