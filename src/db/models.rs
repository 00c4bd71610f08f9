use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A track as stored and returned over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub artist: String,
    /// Length in seconds.
    pub duration: f64,
    pub last_play: NaiveDateTime,
}

/// Data for inserting a track (seed file or POST body).
/// `id` is optional; the store assigns one when it is missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTrack {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub artist: String,
    pub duration: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub last_play: NaiveDateTime,
}

/// Partial update for an existing track. Absent (or null) fields are left alone.
/// An `id` key in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration: Option<f64>,
    #[serde(deserialize_with = "timestamp::deserialize_option")]
    pub last_play: Option<NaiveDateTime>,
}

impl NewTrack {
    pub fn into_track(self, id: i64) -> Track {
        Track {
            id,
            title: self.title,
            artist: self.artist,
            duration: self.duration,
            last_play: self.last_play,
        }
    }
}

impl Track {
    /// Apply every field present in `update`. Never touches `id`.
    pub fn apply(&mut self, update: TrackUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(artist) = update.artist {
            self.artist = artist;
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(last_play) = update.last_play {
            self.last_play = last_play;
        }
    }
}

/// Lenient `last_play` parsing: naive ISO-8601 (`T` or space separated) or
/// RFC 3339 with an offset, which is normalised to UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|t| t.naive_utc()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}"))),
        }
    }
}
