use serde::Deserialize;

use crate::profile::types::{Artist, AudioFeatures, Track};

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PrivateUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistObject {
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u8,
}

impl From<ArtistObject> for Artist {
    fn from(raw: ArtistObject) -> Self {
        Artist {
            name: raw.name,
            genres: raw.genres,
            popularity: raw.popularity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackObject {
    /// Absent for local files, which the client filters out.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimpleArtist {
    pub name: String,
}

impl TrackObject {
    /// Conversion keyed by the track id; local files without one are
    /// dropped here.
    pub(crate) fn into_track(self) -> Option<Track> {
        let id = self.id?;
        let artist = self
            .artists
            .into_iter()
            .next()
            .map(|artist| artist.name)
            .unwrap_or_else(|| "Unknown".to_owned());
        Some(Track {
            id,
            name: self.name,
            artist,
        })
    }
}

/// Envelope of the bulk audio-features endpoint. The inner list is
/// index-aligned with the requested ids and carries nulls for tracks
/// without an analysis.
#[derive(Debug, Deserialize)]
pub(crate) struct AudioFeaturesEnvelope {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeaturesObject>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct AudioFeaturesObject {
    #[serde(default)]
    pub danceability: f32,
    #[serde(default)]
    pub energy: f32,
    #[serde(default)]
    pub acousticness: f32,
    #[serde(default)]
    pub instrumentalness: f32,
    #[serde(default)]
    pub valence: f32,
    #[serde(default)]
    pub tempo: f32,
    #[serde(default)]
    pub loudness: f32,
    #[serde(default)]
    pub speechiness: f32,
}

impl From<AudioFeaturesObject> for AudioFeatures {
    fn from(raw: AudioFeaturesObject) -> Self {
        AudioFeatures {
            danceability: raw.danceability,
            energy: raw.energy,
            acousticness: raw.acousticness,
            instrumentalness: raw.instrumentalness,
            valence: raw.valence,
            tempo: raw.tempo,
            loudness: raw.loudness,
            speechiness: raw.speechiness,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: ApiErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_conversion_takes_primary_artist() {
        let raw = TrackObject {
            id: Some("t1".into()),
            name: "Voilà".into(),
            artists: vec![
                SimpleArtist {
                    name: "Françoise Hardy".into(),
                },
                SimpleArtist {
                    name: "Iggy Pop".into(),
                },
            ],
        };
        let track = raw.into_track().unwrap();
        assert_eq!(track.artist, "Françoise Hardy");
    }

    #[test]
    fn track_without_artists_falls_back_to_unknown() {
        let raw = TrackObject {
            id: Some("t1".into()),
            name: "Untagged".into(),
            artists: Vec::new(),
        };
        assert_eq!(raw.into_track().unwrap().artist, "Unknown");
    }

    #[test]
    fn local_tracks_without_id_are_dropped() {
        let raw = TrackObject {
            id: None,
            name: "Bootleg".into(),
            artists: Vec::new(),
        };
        assert!(raw.into_track().is_none());
    }

    #[test]
    fn audio_features_envelope_keeps_nulls() {
        let json = r#"{"audio_features": [null, {"energy": 0.5, "tempo": 98.0}]}"#;
        let envelope: AudioFeaturesEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.audio_features.len(), 2);
        assert!(envelope.audio_features[0].is_none());
        let features: AudioFeatures = envelope.audio_features[1].as_ref().copied().unwrap().into();
        assert!((features.energy - 0.5).abs() < 1e-6);
        assert!((features.tempo - 98.0).abs() < 1e-6);
    }
}
