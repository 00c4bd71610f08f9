use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::ffi::ErrorCode;

use super::{Result, StoreError, TrackStore};
use crate::db::models::{NewTrack, Track, TrackUpdate};
use crate::db::{Database, DbError};

/// SQLite-backed store. One connection, serialized behind a mutex;
/// every write runs in its own transaction.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// Map a primary key collision to `DuplicateId`, pass everything else through.
fn classify(err: DbError, id: Option<i64>) -> StoreError {
    if let (DbError::Sqlite(rusqlite::Error::SqliteFailure(e, _)), Some(id)) = (&err, id) {
        if e.code == ErrorCode::ConstraintViolation {
            return StoreError::DuplicateId(id);
        }
    }
    StoreError::Db(err)
}

impl TrackStore for SqliteStore {
    fn list(&self) -> Result<Vec<Track>> {
        Ok(self.lock()?.list_tracks()?)
    }

    fn get(&self, id: i64) -> Result<Option<Track>> {
        Ok(self.lock()?.get_track(id)?)
    }

    fn create(&self, track: NewTrack) -> Result<Track> {
        let db = self.lock()?;
        let created = db.insert_track(&track).map_err(|e| classify(e, track.id))?;
        log::debug!("Created track {} ({})", created.id, created.title);
        Ok(created)
    }

    fn update(&self, id: i64, update: TrackUpdate) -> Result<Option<Track>> {
        Ok(self.lock()?.update_track(id, update)?)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.lock()?.delete_track(id)?)
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.count_tracks()? == 0)
    }

    fn insert_batch(&self, tracks: Vec<NewTrack>) -> Result<usize> {
        let db = self.lock()?;
        db.insert_tracks(&tracks)
            .map_err(|e| classify(e, first_taken_id(&db, &tracks)))
    }
}

/// First explicit id in `tracks` that repeats within the batch or already exists.
fn first_taken_id(db: &Database, tracks: &[NewTrack]) -> Option<i64> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .filter_map(|t| t.id)
        .find(|id| !seen.insert(*id) || matches!(db.get_track(*id), Ok(Some(_))))
}
