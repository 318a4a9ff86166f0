use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::{Agent, AgentBuilder};

use super::types::{
    ApiErrorBody, ArtistObject, AudioFeaturesEnvelope, Paging, PrivateUser, TokenResponse,
    TrackObject,
};
use crate::config::SpotifyConfig;
use crate::profile::source::{
    AuthProvider, ListeningSource, SourceError, TokenPair, UserSummary,
};
use crate::profile::types::{Artist, AudioFeatures, TimeRange, Track};

/// Page size for the top-items endpoints, the service maximum.
const TOP_ITEMS_LIMIT: &str = "50";
/// The bulk audio-features endpoint accepts at most this many ids.
const AUDIO_FEATURES_CHUNK: usize = 100;

/// Blocking Spotify Web API client. Cheap to clone; worker threads take
/// their own copy.
#[derive(Clone)]
pub struct SpotifyClient {
    agent: Agent,
    config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(config.timeout_secs))
            .timeout_write(Duration::from_secs(config.timeout_secs))
            .build();
        Self { agent, config }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        debug!(%url, "spotify request");
        let mut request = self
            .agent
            .get(url)
            .set("Authorization", &format!("Bearer {token}"));
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request.call().map_err(classify_error)?;
        response
            .into_json::<T>()
            .map_err(|error| SourceError::Decode(error.to_string()))
    }
}

/// Maps transport and status failures onto the source error taxonomy.
/// 401 means the token is no longer usable and surfaces as an auth
/// failure so the app can fall back to the anonymous view.
fn classify_error(error: ureq::Error) -> SourceError {
    match error {
        ureq::Error::Status(401, _) => SourceError::Auth("access token rejected".to_owned()),
        ureq::Error::Status(code, response) => {
            let message = response
                .into_json::<ApiErrorBody>()
                .map(|body| body.error.message)
                .unwrap_or_default();
            if message.is_empty() {
                SourceError::Request(format!("status {code}"))
            } else {
                SourceError::Request(format!("status {code}: {message}"))
            }
        }
        ureq::Error::Transport(transport) => SourceError::Request(transport.to_string()),
    }
}

impl ListeningSource for SpotifyClient {
    fn current_user(&self, token: &str) -> Result<UserSummary, SourceError> {
        let url = format!("{}/me", self.config.api_base);
        let user: PrivateUser = self.get_json(&url, token, &[])?;
        Ok(UserSummary {
            id: user.id,
            display_name: user.display_name,
        })
    }

    fn top_artists(&self, token: &str, range: TimeRange) -> Result<Vec<Artist>, SourceError> {
        let url = format!("{}/me/top/artists", self.config.api_base);
        let page: Paging<ArtistObject> = self.get_json(
            &url,
            token,
            &[("time_range", range.as_param()), ("limit", TOP_ITEMS_LIMIT)],
        )?;
        Ok(page.items.into_iter().map(Artist::from).collect())
    }

    fn top_tracks(&self, token: &str, range: TimeRange) -> Result<Vec<Track>, SourceError> {
        let url = format!("{}/me/top/tracks", self.config.api_base);
        let page: Paging<TrackObject> = self.get_json(
            &url,
            token,
            &[("time_range", range.as_param()), ("limit", TOP_ITEMS_LIMIT)],
        )?;
        Ok(page
            .items
            .into_iter()
            .filter_map(TrackObject::into_track)
            .collect())
    }

    fn audio_features(
        &self,
        token: &str,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SourceError> {
        if track_ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/audio-features", self.config.api_base);
        let mut collected = Vec::with_capacity(track_ids.len());
        for chunk in track_ids.chunks(AUDIO_FEATURES_CHUNK) {
            let ids = chunk.join(",");
            let envelope: AudioFeaturesEnvelope =
                self.get_json(&url, token, &[("ids", ids.as_str())])?;
            collected.extend(
                envelope
                    .audio_features
                    .into_iter()
                    .map(|entry| entry.map(AudioFeatures::from)),
            );
        }
        Ok(collected)
    }
}

impl AuthProvider for SpotifyClient {
    fn exchange_code(&self, code: &str) -> Result<TokenPair, SourceError> {
        let url = format!("{}/api/token", self.config.accounts_base);
        let response = self
            .agent
            .post(&url)
            .send_form(&[
                ("grant_type", "authorization_code"),
                ("code", code.trim()),
                ("redirect_uri", &self.config.redirect_uri),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
            ])
            .map_err(|error| match error {
                // The token endpoint answers 400 for spent or mistyped
                // codes; treat that like a rejected credential.
                ureq::Error::Status(400 | 401, _) => {
                    SourceError::Auth("authorization code rejected".to_owned())
                }
                other => classify_error(other),
            })?;
        let token: TokenResponse = response
            .into_json()
            .map_err(|error| SourceError::Decode(error.to_string()))?;
        Ok(TokenPair {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }
}
