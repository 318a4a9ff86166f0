use std::collections::HashMap;

use tracing::{debug, warn};

use super::source::{ListeningSource, SourceError};
use super::types::{
    Artist, AudioFeatures, GenreScore, TasteProfile, TimeRange, GENRE_SCORE_CAP,
    SELECTED_GENRE_CAP,
};

/// Folds artist genre tags into a normalized distribution. Each tag on
/// an artist contributes popularity/100; the result is divided by the
/// largest weight so the strongest genre scores exactly 1.0. Order is
/// descending by score, with first-seen order breaking ties.
pub fn accumulate_genre_scores(artists: &[Artist]) -> Vec<GenreScore> {
    let mut order: Vec<&str> = Vec::new();
    let mut weights: HashMap<&str, f32> = HashMap::new();
    for artist in artists {
        let contribution = f32::from(artist.popularity) / 100.0;
        for genre in &artist.genres {
            let entry = weights.entry(genre.as_str()).or_insert_with(|| {
                order.push(genre.as_str());
                0.0
            });
            *entry += contribution;
        }
    }

    let max_weight = weights.values().fold(0.0_f32, |max, &w| max.max(w));
    let mut scores: Vec<GenreScore> = order
        .into_iter()
        .map(|genre| GenreScore {
            genre: genre.to_owned(),
            score: if max_weight > 0.0 {
                weights[genre] / max_weight
            } else {
                0.0
            },
        })
        .collect();
    // Stable sort keeps first-seen order among equal scores.
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Element-wise mean over the tracks that have an analysis. All zeros
/// when none do.
pub fn average_audio_features(per_track: &[Option<AudioFeatures>]) -> AudioFeatures {
    let mut sum = AudioFeatures::default();
    let mut present = 0usize;
    for features in per_track.iter().flatten() {
        sum.danceability += features.danceability;
        sum.energy += features.energy;
        sum.acousticness += features.acousticness;
        sum.instrumentalness += features.instrumentalness;
        sum.valence += features.valence;
        sum.tempo += features.tempo;
        sum.loudness += features.loudness;
        sum.speechiness += features.speechiness;
        present += 1;
    }
    if present == 0 {
        return AudioFeatures::default();
    }
    let n = present as f32;
    AudioFeatures {
        danceability: sum.danceability / n,
        energy: sum.energy / n,
        acousticness: sum.acousticness / n,
        instrumentalness: sum.instrumentalness / n,
        valence: sum.valence / n,
        tempo: sum.tempo / n,
        loudness: sum.loudness / n,
        speechiness: sum.speechiness / n,
    }
}

/// Fetches one listener's top items and derives their taste profile.
/// A failed audio feature fetch is tolerated: the averages come back
/// zeroed and the profile is flagged partial. Identity and top-item
/// failures abort.
pub fn build_profile<S>(
    source: &S,
    token: &str,
    time_range: TimeRange,
) -> Result<TasteProfile, SourceError>
where
    S: ListeningSource + ?Sized,
{
    let user = source.current_user(token)?;
    let artists = source.top_artists(token, time_range)?;
    let tracks = source.top_tracks(token, time_range)?;
    debug!(
        user = %user.id,
        artists = artists.len(),
        tracks = tracks.len(),
        range = time_range.as_param(),
        "fetched top items"
    );

    let track_ids: Vec<String> = tracks.iter().map(|track| track.id.clone()).collect();
    let (audio_features, features_partial) = match source.audio_features(token, &track_ids) {
        Ok(per_track) => (average_audio_features(&per_track), false),
        Err(error) => {
            warn!(%error, "audio feature fetch failed; storing zeroed averages");
            (AudioFeatures::default(), true)
        }
    };

    let mut genre_scores = accumulate_genre_scores(&artists);
    let selected_genres: Vec<String> = genre_scores
        .iter()
        .take(SELECTED_GENRE_CAP)
        .map(|entry| entry.genre.clone())
        .collect();
    genre_scores.truncate(GENRE_SCORE_CAP);

    let display_name = user.label().to_owned();
    Ok(TasteProfile {
        user_id: user.id,
        display_name,
        time_range,
        top_artists: artists.iter().map(|artist| artist.name.clone()).collect(),
        top_artists_with_genres: artists,
        top_tracks: tracks,
        selected_genres,
        genre_scores,
        audio_features,
        features_partial,
    })
}
