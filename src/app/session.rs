use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError, channel};

use tracing::{debug, warn};

use super::{ProfileBundle, ScoreOverlay, ViewModel};
use crate::profile::build::build_profile;
use crate::profile::compare::overlap_score;
use crate::profile::matcher::match_scores_to_atlas;
use crate::profile::source::{AuthProvider, SourceError, TokenPair};
use crate::profile::types::TasteProfile;
use crate::store::{ACCESS_TOKEN_KEY, CACHED_PROFILE_KEY, REFRESH_TOKEN_KEY, StoreError};

/// A background computation with the session generation it was started
/// under. Results from an older generation are thrown away on arrival.
pub(super) struct Job<T> {
    generation: u64,
    rx: Receiver<T>,
}

impl<T: Send + 'static> Job<T> {
    pub(super) fn spawn(generation: u64, work: impl FnOnce() -> T + Send + 'static) -> Self {
        let (tx, rx) = channel();
        std::thread::spawn(move || {
            let _ = tx.send(work());
        });
        Self { generation, rx }
    }
}

/// Non-blocking check of a job slot. Yields the result once, clears the
/// slot when the job finished or died, and drops results whose
/// generation no longer matches.
pub(super) fn poll<T>(slot: &mut Option<Job<T>>, current_generation: u64) -> Option<T> {
    let job = slot.as_mut()?;
    match job.rx.try_recv() {
        Ok(value) => {
            let generation = job.generation;
            *slot = None;
            if generation == current_generation {
                Some(value)
            } else {
                debug!(
                    generation,
                    current_generation, "discarding stale background result"
                );
                None
            }
        }
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            warn!("background job vanished without a result");
            *slot = None;
            None
        }
    }
}

impl ViewModel {
    /// Exchanges the pasted authorization code in the background. The
    /// profile build is chained once tokens arrive.
    pub(super) fn connect(&mut self) {
        let code = self.auth_code.trim().to_owned();
        if code.is_empty() {
            self.status = Some("Paste an authorization code first".to_owned());
            return;
        }
        self.generation += 1;
        let client = self.spotify.clone();
        self.status = Some("Exchanging authorization code...".to_owned());
        self.auth_job = Some(Job::spawn(self.generation, move || {
            client.exchange_code(&code)
        }));
    }

    /// Forgets tokens, profile and comparison, returning to the
    /// anonymous view. In-flight jobs are orphaned by the generation
    /// bump.
    pub(super) fn disconnect(&mut self) {
        self.generation += 1;
        self.auth_job = None;
        self.profile_job = None;
        self.access_token = None;
        self.refresh_token = None;
        self.profile = None;
        self.own_scores = None;
        self.clear_comparison();
        if let Err(error) = self.session_store.clear() {
            warn!(%error, "failed to clear session store");
        }
        self.status = Some("Disconnected".to_owned());
    }

    /// Rebuilds the taste profile for the current time range. The
    /// worker fetches top items, publishes the profile to the store and
    /// projects the scores onto the atlas, so the UI thread only swaps
    /// the finished bundle in.
    pub(super) fn refresh_profile(&mut self) {
        let Some(token) = self.access_token.clone() else {
            return;
        };
        self.generation += 1;
        let client = self.spotify.clone();
        let store = Arc::clone(&self.profile_store);
        let range = self.time_range;
        let acceptance = self.encoding.matcher_acceptance;
        let atlas_ids = self.atlas.id_list();
        self.status = Some(format!("Building taste profile ({})...", range.label()));
        self.profile_job = Some(Job::spawn(self.generation, move || {
            let profile = build_profile(&client, &token, range)?;
            if let Err(error) = store.save(&profile) {
                warn!(%error, "could not publish profile to the store");
            }
            let mapped = match_scores_to_atlas(&profile.genre_scores, &atlas_ids, acceptance);
            Ok(ProfileBundle { profile, mapped })
        }));
    }

    /// Fetches another listener's published profile for comparison.
    pub(super) fn start_compare(&mut self) {
        let target = self.compare_input.trim().to_owned();
        if target.is_empty() {
            self.status = Some("Enter a user id to compare with".to_owned());
            return;
        }
        if self.own_scores.is_none() {
            self.status = Some("Connect your account before comparing".to_owned());
            return;
        }
        self.generation += 1;
        let store = Arc::clone(&self.profile_store);
        let acceptance = self.encoding.matcher_acceptance;
        let atlas_ids = self.atlas.id_list();
        self.status = Some(format!("Fetching profile for {target}..."));
        self.friend_job = Some(Job::spawn(self.generation, move || {
            let profile = store.get_by_user_id(&target)?;
            let mapped = match_scores_to_atlas(&profile.genre_scores, &atlas_ids, acceptance);
            Ok(ProfileBundle { profile, mapped })
        }));
    }

    pub(super) fn clear_comparison(&mut self) {
        self.comparing = false;
        self.friend_profile = None;
        self.friend_scores = None;
        self.overlap = None;
        self.friend_job = None;
    }

    /// Drains finished background work. Called once per frame.
    pub(super) fn poll_jobs(&mut self) {
        if let Some(result) = poll(&mut self.auth_job, self.generation) {
            match result {
                Ok(tokens) => {
                    self.apply_tokens(tokens);
                    self.refresh_profile();
                }
                Err(error) => {
                    warn!(%error, "authorization failed");
                    self.status = Some(format!("Authorization failed: {error}"));
                }
            }
        }

        if let Some(result) = poll(&mut self.profile_job, self.generation) {
            match result {
                Ok(bundle) => self.apply_own_bundle(bundle),
                Err(SourceError::Auth(message)) => {
                    warn!(%message, "session no longer valid");
                    self.access_token = None;
                    self.refresh_token = None;
                    if let Err(error) = self.session_store.clear() {
                        warn!(%error, "failed to clear session store");
                    }
                    self.status = Some("Session expired; connect again".to_owned());
                }
                Err(error) => {
                    self.status = Some(format!("Profile build failed: {error}"));
                }
            }
        }

        if let Some(result) = poll(&mut self.friend_job, self.generation) {
            match result {
                Ok(bundle) => self.apply_friend_bundle(bundle),
                Err(StoreError::NotFound(user)) => {
                    self.status = Some(format!("No stored profile for {user}"));
                }
                Err(error) => {
                    self.status = Some(format!("Comparison fetch failed: {error}"));
                }
            }
        }
    }

    fn apply_tokens(&mut self, tokens: TokenPair) {
        if let Err(error) = self.session_store.set(ACCESS_TOKEN_KEY, &tokens.access_token) {
            warn!(%error, "failed to persist access token");
        }
        if let Some(refresh) = &tokens.refresh_token {
            if let Err(error) = self.session_store.set(REFRESH_TOKEN_KEY, refresh) {
                warn!(%error, "failed to persist refresh token");
            }
        }
        self.access_token = Some(tokens.access_token);
        self.refresh_token = tokens.refresh_token;
        self.auth_code.clear();
        self.status = Some("Connected".to_owned());
    }

    fn apply_own_bundle(&mut self, bundle: ProfileBundle) {
        match serde_json::to_string(&bundle.profile) {
            Ok(raw) => {
                if let Err(error) = self.session_store.set(CACHED_PROFILE_KEY, &raw) {
                    warn!(%error, "failed to cache profile in session");
                }
            }
            Err(error) => warn!(%error, "profile serialization failed"),
        }
        self.status = Some(format!(
            "Profile ready for {} ({} genres mapped)",
            bundle.profile.display_name,
            bundle.mapped.len()
        ));
        self.own_scores = Some(Arc::new(ScoreOverlay::new(bundle.mapped, &self.atlas)));
        self.profile = Some(Arc::new(bundle.profile));
        self.recompute_overlap();
    }

    fn apply_friend_bundle(&mut self, bundle: ProfileBundle) {
        self.status = Some(format!("Comparing with {}", bundle.profile.display_name));
        self.friend_scores = Some(Arc::new(ScoreOverlay::new(bundle.mapped, &self.atlas)));
        self.friend_profile = Some(Arc::new(bundle.profile));
        self.comparing = true;
        self.recompute_overlap();
    }

    fn recompute_overlap(&mut self) {
        self.overlap = match (&self.own_scores, &self.friend_scores) {
            (Some(own), Some(friend)) => Some(overlap_score(own.by_id(), friend.by_id())),
            _ => None,
        };
    }

    /// Rehydrates tokens and the cached profile from the session store.
    /// With a token but no usable cache, a fresh build starts right
    /// away.
    pub(super) fn restore_session(&mut self) {
        self.access_token = self.session_store.get(ACCESS_TOKEN_KEY);
        self.refresh_token = self.session_store.get(REFRESH_TOKEN_KEY);
        if self.access_token.is_none() {
            return;
        }

        if let Some(raw) = self.session_store.get(CACHED_PROFILE_KEY) {
            match serde_json::from_str::<TasteProfile>(&raw) {
                Ok(profile) => {
                    let mapped = match_scores_to_atlas(
                        &profile.genre_scores,
                        &self.atlas.id_list(),
                        self.encoding.matcher_acceptance,
                    );
                    self.time_range = profile.time_range;
                    self.status = Some(format!("Welcome back, {}", profile.display_name));
                    self.own_scores = Some(Arc::new(ScoreOverlay::new(mapped, &self.atlas)));
                    self.profile = Some(Arc::new(profile));
                    return;
                }
                Err(error) => {
                    warn!(%error, "cached profile is unreadable; rebuilding");
                }
            }
        }
        self.refresh_profile();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_job<T: Send + 'static>(generation: u64, value: T) -> Job<T> {
        let (tx, rx) = channel();
        tx.send(value).unwrap();
        Job { generation, rx }
    }

    #[test]
    fn poll_yields_matching_generation_results() {
        let mut slot = Some(finished_job(3, 42));
        assert_eq!(poll(&mut slot, 3), Some(42));
        assert!(slot.is_none());
    }

    #[test]
    fn poll_discards_stale_results() {
        let mut slot = Some(finished_job(3, 42));
        assert_eq!(poll(&mut slot, 4), None);
        // The slot is freed even though the value was discarded.
        assert!(slot.is_none());
    }

    #[test]
    fn poll_leaves_pending_jobs_in_place() {
        let (_tx, rx) = channel::<u32>();
        let mut slot = Some(Job { generation: 1, rx });
        assert_eq!(poll(&mut slot, 1), None);
        assert!(slot.is_some());
    }

    #[test]
    fn poll_clears_disconnected_jobs() {
        let (tx, rx) = channel::<u32>();
        drop(tx);
        let mut slot = Some(Job { generation: 1, rx });
        assert_eq!(poll(&mut slot, 1), None);
        assert!(slot.is_none());
    }

    #[test]
    fn spawned_jobs_deliver_their_result() {
        let job = Job::spawn(7, || 1 + 1);
        let mut slot = Some(job);
        let mut waited = 0;
        loop {
            if let Some(value) = poll(&mut slot, 7) {
                assert_eq!(value, 2);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
            waited += 1;
            assert!(waited < 200, "job never finished");
        }
    }
}
