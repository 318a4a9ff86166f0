use std::time::Duration;

use tracing::debug;
use ureq::{Agent, AgentBuilder};

use super::{ProfileStore, StoreError};
use crate::config::StoreConfig;
use crate::profile::types::TasteProfile;

/// Client for the shared profile service. Profiles are published with
/// `POST {base}/profiles` and fetched with `GET {base}/profiles/{id}`.
pub struct RestProfileStore {
    agent: Agent,
    base_url: String,
}

impl RestProfileStore {
    pub fn new(config: &StoreConfig) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(config.timeout_secs))
            .timeout_write(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl ProfileStore for RestProfileStore {
    fn save(&self, profile: &TasteProfile) -> Result<(), StoreError> {
        let url = format!("{}/profiles", self.base_url);
        debug!(%url, user = %profile.user_id, "publishing profile");
        let payload = serde_json::to_value(profile)
            .map_err(|error| StoreError::Decode(error.to_string()))?;
        self.agent
            .post(&url)
            .send_json(payload)
            .map_err(classify_error)?;
        Ok(())
    }

    fn get_by_user_id(&self, user_id: &str) -> Result<TasteProfile, StoreError> {
        let url = format!("{}/profiles/{user_id}", self.base_url);
        debug!(%url, "fetching profile");
        let response = self.agent.get(&url).call().map_err(|error| match error {
            ureq::Error::Status(404, _) => StoreError::NotFound(user_id.to_owned()),
            other => classify_error(other),
        })?;
        response
            .into_json::<TasteProfile>()
            .map_err(|error| StoreError::Decode(error.to_string()))
    }
}

fn classify_error(error: ureq::Error) -> StoreError {
    match error {
        ureq::Error::Status(code, _) => StoreError::Request(format!("status {code}")),
        ureq::Error::Transport(transport) => StoreError::Request(transport.to_string()),
    }
}
