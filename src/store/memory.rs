use std::collections::HashMap;
use std::sync::Mutex;

use super::{ProfileStore, SessionStore, StoreError};
use crate::profile::types::TasteProfile;

/// In-process profile store, used when no store service is configured.
/// Comparisons then only see profiles published in this run.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, TasteProfile>>,
}

impl ProfileStore for MemoryProfileStore {
    fn save(&self, profile: &TasteProfile) -> Result<(), StoreError> {
        let mut profiles = self
            .profiles
            .lock()
            .map_err(|_| StoreError::Request("profile store mutex poisoned".to_owned()))?;
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    fn get_by_user_id(&self, user_id: &str) -> Result<TasteProfile, StoreError> {
        let profiles = self
            .profiles
            .lock()
            .map_err(|_| StoreError::Request("profile store mutex poisoned".to_owned()))?;
        profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.to_owned()))
    }
}

/// Session store that forgets everything on exit. Fallback for when no
/// writable config directory exists.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.values.clear();
        Ok(())
    }
}
