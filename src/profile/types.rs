use serde::{Deserialize, Serialize};

/// Listening history window offered by the streaming service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [
        TimeRange::ShortTerm,
        TimeRange::MediumTerm,
        TimeRange::LongTerm,
    ];

    /// Wire value expected by the top-items endpoints.
    pub fn as_param(self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "Last 4 weeks",
            TimeRange::MediumTerm => "Last 6 months",
            TimeRange::LongTerm => "All time",
        }
    }
}

/// An artist as reported by the listening source, carrying the genre
/// tags and 0-100 popularity used to weight the taste distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
}

/// One point of the per-track audio analysis, and also the element-wise
/// average of many of them. Tempo is in BPM, loudness in dB (negative),
/// the rest are 0..1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f32,
    pub energy: f32,
    pub acousticness: f32,
    pub instrumentalness: f32,
    pub valence: f32,
    pub tempo: f32,
    pub loudness: f32,
    pub speechiness: f32,
}

/// A genre name with its normalized 0..1 weight in the listener's taste.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreScore {
    pub genre: String,
    pub score: f32,
}

/// Cap on the headline genre list stored with a profile.
pub const SELECTED_GENRE_CAP: usize = 20;
/// Cap on the full stored score distribution.
pub const GENRE_SCORE_CAP: usize = 100;

/// Everything derived from one listener's top items for one time range.
/// Serialized as-is to the profile store and the session cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteProfile {
    pub user_id: String,
    pub display_name: String,
    pub time_range: TimeRange,
    /// Artist names in rank order.
    pub top_artists: Vec<String>,
    pub top_artists_with_genres: Vec<Artist>,
    pub top_tracks: Vec<Track>,
    /// Strongest genres, capped at [`SELECTED_GENRE_CAP`].
    pub selected_genres: Vec<String>,
    /// Full distribution, descending, capped at [`GENRE_SCORE_CAP`].
    pub genre_scores: Vec<GenreScore>,
    pub audio_features: AudioFeatures,
    /// Set when the audio feature fetch failed and the averages are zeroed.
    #[serde(default)]
    pub features_partial: bool,
}
