use genre_atlas::profile::source::{ListeningSource, SourceError, UserSummary};
use genre_atlas::profile::types::{Artist, AudioFeatures, TimeRange, Track};
use genre_atlas::profile::{
    Relevance, build_profile, classify_relevance, match_scores_to_atlas, overlap_score,
};
use genre_atlas::store::{MemoryProfileStore, ProfileStore, StoreError};

struct StubListener {
    id: &'static str,
    artists: Vec<Artist>,
}

fn artist(name: &str, genres: &[&str], popularity: u8) -> Artist {
    Artist {
        name: name.to_owned(),
        genres: genres.iter().map(|genre| (*genre).to_owned()).collect(),
        popularity,
    }
}

impl ListeningSource for StubListener {
    fn current_user(&self, _token: &str) -> Result<UserSummary, SourceError> {
        Ok(UserSummary {
            id: self.id.to_owned(),
            display_name: Some(format!("{} display", self.id)),
        })
    }

    fn top_artists(&self, _token: &str, _range: TimeRange) -> Result<Vec<Artist>, SourceError> {
        Ok(self.artists.clone())
    }

    fn top_tracks(&self, _token: &str, _range: TimeRange) -> Result<Vec<Track>, SourceError> {
        Ok(vec![Track {
            id: "t1".to_owned(),
            name: "Archangel".to_owned(),
            artist: "Burial".to_owned(),
        }])
    }

    fn audio_features(
        &self,
        _token: &str,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SourceError> {
        Ok(track_ids
            .iter()
            .map(|_| {
                Some(AudioFeatures {
                    energy: 0.6,
                    ..AudioFeatures::default()
                })
            })
            .collect())
    }
}

fn atlas_ids() -> Vec<String> {
    ["uk garage", "future garage", "folktronica", "brostep", "edm"]
        .iter()
        .map(|id| (*id).to_owned())
        .collect()
}

#[test]
fn two_listeners_build_publish_and_compare() {
    let own_source = StubListener {
        id: "night-bus",
        artists: vec![
            artist("Burial", &["uk garage", "future garage"], 80),
            artist("Four Tet", &["folktronica", "uk garage", "ambient techno"], 75),
        ],
    };
    let friend_source = StubListener {
        id: "bass-face",
        artists: vec![
            artist("Skrillex", &["brostep", "edm"], 90),
            artist("Flux Pavilion", &["brostep"], 70),
            artist("El-B", &["uk garage"], 60),
        ],
    };

    let own = build_profile(&own_source, "token-a", TimeRange::MediumTerm).expect("own profile");
    let friend =
        build_profile(&friend_source, "token-b", TimeRange::MediumTerm).expect("friend profile");

    // uk garage carries the most weight for the first listener.
    assert_eq!(own.selected_genres[0], "uk garage");
    assert_eq!(own.genre_scores.len(), 4);
    assert!(!own.features_partial);
    assert!((own.audio_features.energy - 0.6).abs() < 1e-6);

    // Publish both, then fetch the friend back the way the comparison
    // flow does.
    let store = MemoryProfileStore::default();
    store.save(&own).expect("publish own");
    store.save(&friend).expect("publish friend");
    let fetched = store.get_by_user_id("bass-face").expect("stored friend");
    assert_eq!(fetched.display_name, "bass-face display");

    let ids = atlas_ids();
    let own_map = match_scores_to_atlas(&own.genre_scores, &ids, 0.2);
    let friend_map = match_scores_to_atlas(&fetched.genre_scores, &ids, 0.2);

    // "ambient techno" has no atlas counterpart and is dropped.
    assert_eq!(own_map.len(), 3);
    assert_eq!(friend_map.len(), 3);
    assert!((own_map["uk garage"] - 1.0).abs() < 1e-6);
    assert!((friend_map["uk garage"] - 0.375).abs() < 1e-5);

    // min sum 0.375 over a union weight of 3.5625 -> 10.5% -> 11.
    assert_eq!(overlap_score(&own_map, &friend_map), 11);
    assert_eq!(overlap_score(&friend_map, &own_map), 11);

    let threshold = 0.1;
    assert_eq!(
        classify_relevance(own_map["uk garage"], friend_map["uk garage"], threshold),
        Relevance::Shared
    );
    assert_eq!(
        classify_relevance(own_map["folktronica"], 0.0, threshold),
        Relevance::SelfOnly
    );
    assert_eq!(
        classify_relevance(0.0, friend_map["edm"], threshold),
        Relevance::FriendOnly
    );
    assert_eq!(classify_relevance(0.0, 0.0, threshold), Relevance::Neither);
}

#[test]
fn missing_users_surface_as_not_found() {
    let store = MemoryProfileStore::default();
    let error = store
        .get_by_user_id("nobody")
        .err()
        .expect("lookup must fail");
    assert!(matches!(error, StoreError::NotFound(user) if user == "nobody"));
}
