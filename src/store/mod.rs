//! Persistence seams: the shared profile store used for comparisons and
//! the local session store that survives restarts.

pub mod memory;
pub mod rest;
pub mod session;

use thiserror::Error;

use crate::profile::types::TasteProfile;

pub use memory::{MemoryProfileStore, MemorySessionStore};
pub use rest::RestProfileStore;
pub use session::FileSessionStore;

/// Session key holding the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Session key holding the refresh token, when the service issued one.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Session key holding the cached profile JSON for instant restore.
pub const CACHED_PROFILE_KEY: &str = "taste_profile";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no profile stored for user {0:?}")]
    NotFound(String),
    #[error("store request failed: {0}")]
    Request(String),
    #[error("malformed store payload: {0}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared storage of published taste profiles, keyed by user id.
/// Saving overwrites any previous profile for the same user.
pub trait ProfileStore: Send + Sync {
    fn save(&self, profile: &TasteProfile) -> Result<(), StoreError>;

    fn get_by_user_id(&self, user_id: &str) -> Result<TasteProfile, StoreError>;
}

/// Small local key-value store for tokens and the cached profile.
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes every stored key. Used on disconnect.
    fn clear(&mut self) -> Result<(), StoreError>;
}
