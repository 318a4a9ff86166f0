//! Taste profile pipeline: turning a listener's top artists and tracks
//! into a normalized genre distribution, projecting it onto the atlas
//! taxonomy, and comparing two projected profiles.

pub mod build;
pub mod compare;
pub mod matcher;
pub mod source;
pub mod types;

pub use build::build_profile;
pub use compare::{Relevance, classify_relevance, overlap_score};
pub use matcher::{match_scores_to_atlas, string_similarity};
pub use source::{AuthProvider, ListeningSource, SourceError, TokenPair, UserSummary};
pub use types::{
    Artist, AudioFeatures, GenreScore, TasteProfile, TimeRange, Track, GENRE_SCORE_CAP,
    SELECTED_GENRE_CAP,
};
