use std::sync::{Mutex, MutexGuard};

use super::{Result, StoreError, TrackStore};
use crate::db::models::{NewTrack, Track, TrackUpdate};

#[derive(Default)]
struct Inner {
    tracks: Vec<Track>,
    /// Next id to hand out. Only ever grows, so deleted ids are never reused.
    next_id: i64,
}

impl Inner {
    fn position(&self, id: i64) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    fn insert(&mut self, track: NewTrack) -> Result<Track> {
        let id = match track.id {
            Some(id) if self.position(id).is_some() => return Err(StoreError::DuplicateId(id)),
            Some(id) => id,
            None => self.next_id.max(1),
        };
        let after = id.checked_add(1).ok_or(StoreError::IdSpaceExhausted(id))?;
        self.next_id = self.next_id.max(after);

        let stored = track.into_track(id);
        self.tracks.push(stored.clone());
        Ok(stored)
    }
}

/// Process-lifetime track list. Insertion order is list order.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl TrackStore for MemoryStore {
    fn list(&self) -> Result<Vec<Track>> {
        Ok(self.lock()?.tracks.clone())
    }

    fn get(&self, id: i64) -> Result<Option<Track>> {
        Ok(self.lock()?.tracks.iter().find(|t| t.id == id).cloned())
    }

    fn create(&self, track: NewTrack) -> Result<Track> {
        self.lock()?.insert(track)
    }

    fn update(&self, id: i64, update: TrackUpdate) -> Result<Option<Track>> {
        let mut inner = self.lock()?;
        Ok(inner.tracks.iter_mut().find(|t| t.id == id).map(|track| {
            track.apply(update);
            track.clone()
        }))
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.position(id) {
            Some(pos) => {
                inner.tracks.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.tracks.is_empty())
    }

    fn insert_batch(&self, tracks: Vec<NewTrack>) -> Result<usize> {
        let mut inner = self.lock()?;

        // Work on a copy so a duplicate id leaves the store untouched
        let mut staged = Inner {
            tracks: inner.tracks.clone(),
            next_id: inner.next_id,
        };
        let count = tracks.len();
        for track in tracks {
            staged.insert(track)?;
        }

        *inner = staged;
        Ok(count)
    }
}
