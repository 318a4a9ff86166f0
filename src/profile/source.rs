use thiserror::Error;

use super::types::{Artist, AudioFeatures, TimeRange, Track};

/// Identity of the account a token belongs to.
#[derive(Debug, Clone)]
pub struct UserSummary {
    pub id: String,
    pub display_name: Option<String>,
}

impl UserSummary {
    /// Display name with the account id as fallback.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    /// The token was rejected. Callers drop back to the anonymous view.
    #[error("authorization rejected: {0}")]
    Auth(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Read access to one listener's history on a streaming service.
/// Implementations are called from worker threads with a borrowed token.
pub trait ListeningSource: Send + Sync {
    fn current_user(&self, token: &str) -> Result<UserSummary, SourceError>;

    fn top_artists(&self, token: &str, range: TimeRange) -> Result<Vec<Artist>, SourceError>;

    fn top_tracks(&self, token: &str, range: TimeRange) -> Result<Vec<Track>, SourceError>;

    /// Per-track analysis, index-aligned with `track_ids`. Entries the
    /// service has no analysis for come back as `None`.
    fn audio_features(
        &self,
        token: &str,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SourceError>;
}

/// Exchange of a pasted authorization code for usable tokens.
pub trait AuthProvider: Send + Sync {
    fn exchange_code(&self, code: &str) -> Result<TokenPair, SourceError>;
}
