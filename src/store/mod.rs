//! Storage backends behind one trait, so the HTTP layer never knows which one it talks to.

pub mod memory;
pub mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;

use crate::db::models::{NewTrack, Track, TrackUpdate};
use crate::db::DbError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Track id {0} already exists")]
    DuplicateId(i64),
    #[error("No id left after {0}")]
    IdSpaceExhausted(i64),
    #[error("Store lock poisoned by a panicked request")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// CRUD over tracks. A missing id is `None`/`false`, never an error.
pub trait TrackStore: Send + Sync {
    fn list(&self) -> Result<Vec<Track>>;

    fn get(&self, id: i64) -> Result<Option<Track>>;

    /// Persist a new track, assigning the next id when none is supplied.
    fn create(&self, track: NewTrack) -> Result<Track>;

    fn update(&self, id: i64, update: TrackUpdate) -> Result<Option<Track>>;

    fn delete(&self, id: i64) -> Result<bool>;

    fn is_empty(&self) -> Result<bool>;

    /// Insert all tracks or none of them. Returns how many were inserted.
    fn insert_batch(&self, tracks: Vec<NewTrack>) -> Result<usize>;
}

/// Which store implementation the process runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Persistent SQLite database
    #[default]
    Sqlite,
    /// Process-lifetime list, lost on exit
    Memory,
}

/// Open the configured backend. `db_path` is only resolved for SQLite.
pub fn open(backend: Backend, db_path: impl FnOnce() -> PathBuf) -> Result<Arc<dyn TrackStore>> {
    match backend {
        Backend::Sqlite => {
            let db_path = db_path();
            log::info!("Database: {}", db_path.display());
            Ok(Arc::new(SqliteStore::open(&db_path)?))
        }
        Backend::Memory => {
            log::info!("Using in-memory store; tracks are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
