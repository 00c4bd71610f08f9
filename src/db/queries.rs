use super::models::{NewTrack, Track, TrackUpdate};
use super::{Database, Result};
use rusqlite::{params, Connection, Row};

const TRACK_COLUMNS: &str = "id, title, artist, duration, last_play";

fn row_to_track(row: &Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        duration: row.get(3)?,
        last_play: row.get(4)?,
    })
}

impl Database {
    /// All tracks in row order.
    pub fn list_tracks(&self) -> Result<Vec<Track>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TRACK_COLUMNS} FROM tracks ORDER BY id"))?;

        let tracks = stmt
            .query_map([], row_to_track)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tracks)
    }

    pub fn get_track(&self, id: i64) -> Result<Option<Track>> {
        Self::select_track(&self.conn, id)
    }

    pub fn count_tracks(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert one track in its own transaction. Returns the stored row.
    pub fn insert_track(&self, t: &NewTrack) -> Result<Track> {
        let tx = self.conn.unchecked_transaction()?;
        let id = Self::insert_row(&tx, t)?;
        tx.commit()?;
        Ok(t.clone().into_track(id))
    }

    /// Insert a batch of tracks atomically: either every row lands or none do.
    pub fn insert_tracks(&self, tracks: &[NewTrack]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for t in tracks {
            Self::insert_row(&tx, t)?;
        }
        tx.commit()?;
        Ok(tracks.len())
    }

    /// Apply a partial update. `None` if no track has this id.
    pub fn update_track(&self, id: i64, update: TrackUpdate) -> Result<Option<Track>> {
        let tx = self.conn.unchecked_transaction()?;

        // Dropping `tx` on the early return rolls it back
        let Some(mut track) = Self::select_track(&tx, id)? else {
            return Ok(None);
        };
        track.apply(update);

        tx.execute(
            "UPDATE tracks SET title = ?2, artist = ?3, duration = ?4, last_play = ?5
             WHERE id = ?1",
            params![track.id, track.title, track.artist, track.duration, track.last_play],
        )?;
        tx.commit()?;
        Ok(Some(track))
    }

    /// Delete a track. Returns false if no track has this id.
    pub fn delete_track(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM tracks WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn select_track(conn: &Connection, id: i64) -> Result<Option<Track>> {
        let result = conn.query_row(
            &format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?1"),
            params![id],
            row_to_track,
        );

        match result {
            Ok(track) => Ok(Some(track)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a row (used within a transaction). A missing id lets SQLite assign one.
    fn insert_row(conn: &Connection, t: &NewTrack) -> Result<i64> {
        conn.execute(
            "INSERT INTO tracks (id, title, artist, duration, last_play)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![t.id, t.title, t.artist, t.duration, t.last_play],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use chrono::NaiveDate;

    fn test_track(title: &str) -> NewTrack {
        NewTrack {
            id: None,
            title: title.to_string(),
            artist: "Grateful Dead".to_string(),
            duration: 300.5,
            last_play: NaiveDate::from_ymd_opt(1977, 5, 8)
                .unwrap()
                .and_hms_opt(21, 15, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let created = db.insert_track(&test_track("Scarlet Begonias")).unwrap();
        assert_eq!(created.id, 1);

        let fetched = db.get_track(created.id).unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[test]
    fn test_get_missing_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_track(999).unwrap(), None);
    }

    #[test]
    fn test_list_in_row_order() {
        let db = Database::open_in_memory().unwrap();
        db.insert_track(&test_track("Scarlet Begonias")).unwrap();
        db.insert_track(&test_track("Fire on the Mountain")).unwrap();

        let titles: Vec<String> = db.list_tracks().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["Scarlet Begonias", "Fire on the Mountain"]);
        assert_eq!(db.count_tracks().unwrap(), 2);
    }

    #[test]
    fn test_explicit_id_honoured() {
        let db = Database::open_in_memory().unwrap();
        let mut t = test_track("Morning Dew");
        t.id = Some(40);
        assert_eq!(db.insert_track(&t).unwrap().id, 40);
        assert_eq!(db.insert_track(&test_track("Next")).unwrap().id, 41);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let db = Database::open_in_memory().unwrap();
        db.insert_track(&test_track("One")).unwrap();
        let second = db.insert_track(&test_track("Two")).unwrap();
        assert!(db.delete_track(second.id).unwrap());

        let third = db.insert_track(&test_track("Three")).unwrap();
        assert_eq!(third.id, 3);
    }

    #[test]
    fn test_partial_update() {
        let db = Database::open_in_memory().unwrap();
        let created = db.insert_track(&test_track("Scarlet")).unwrap();

        let update = TrackUpdate {
            title: Some("Scarlet Begonias".into()),
            duration: Some(612.0),
            ..Default::default()
        };
        let updated = db.update_track(created.id, update).unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Scarlet Begonias");
        assert_eq!(updated.duration, 612.0);
        assert_eq!(updated.artist, created.artist);
        assert_eq!(updated.last_play, created.last_play);

        assert_eq!(db.get_track(created.id).unwrap(), Some(updated));
    }

    #[test]
    fn test_update_missing_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.update_track(5, TrackUpdate::default()).unwrap(), None);
    }

    #[test]
    fn test_delete() {
        let db = Database::open_in_memory().unwrap();
        let created = db.insert_track(&test_track("Dark Star")).unwrap();
        assert!(db.delete_track(created.id).unwrap());
        assert!(!db.delete_track(created.id).unwrap());
        assert_eq!(db.get_track(created.id).unwrap(), None);
    }

    #[test]
    fn test_batch_insert_is_atomic() {
        let db = Database::open_in_memory().unwrap();
        let mut a = test_track("A");
        a.id = Some(1);
        let mut b = test_track("B");
        b.id = Some(1);

        let result = db.insert_tracks(&[a, b]);
        assert!(matches!(result, Err(DbError::Sqlite(_))));
        assert_eq!(db.count_tracks().unwrap(), 0);

        assert_eq!(db.insert_tracks(&[test_track("A"), test_track("B")]).unwrap(), 2);
        assert_eq!(db.count_tracks().unwrap(), 2);
    }
}
