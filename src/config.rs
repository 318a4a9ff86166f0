use std::path::Path;

use serde::{Deserialize, Serialize};

/// Force layout tuning. Defaults reproduce the d3-force parameters the
/// genre map was originally laid out with, so a freshly loaded atlas
/// settles into the familiar shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Rest length of every genre link, in world units.
    #[serde(default = "SimulationConfig::default_link_distance")]
    pub link_distance: f32,
    /// Link spring strength, scaled per endpoint by degree bias.
    #[serde(default = "SimulationConfig::default_link_strength")]
    pub link_strength: f32,
    /// Many-body charge. Negative values repel.
    #[serde(default = "SimulationConfig::default_charge_strength")]
    pub charge_strength: f32,
    /// Pull toward each genre's taxonomy anchor, applied per axis.
    #[serde(default = "SimulationConfig::default_anchor_strength")]
    pub anchor_strength: f32,
    /// Fraction of velocity lost per tick.
    #[serde(default = "SimulationConfig::default_velocity_decay")]
    pub velocity_decay: f32,
    /// Barnes-Hut approximation threshold.
    #[serde(default = "SimulationConfig::default_theta")]
    pub theta: f32,
    /// Squared distances below this are softened before the charge kernel.
    #[serde(default = "SimulationConfig::default_charge_distance_min")]
    pub charge_distance_min: f32,
    /// Simulation is settled once alpha drifts below this floor.
    #[serde(default = "SimulationConfig::default_alpha_min")]
    pub alpha_min: f32,
    /// Per-tick interpolation rate of alpha toward its target.
    #[serde(default = "SimulationConfig::default_alpha_decay")]
    pub alpha_decay: f32,
    /// Alpha target while a node is being dragged.
    #[serde(default = "SimulationConfig::default_drag_alpha_target")]
    pub drag_alpha_target: f32,
}

impl SimulationConfig {
    fn default_link_distance() -> f32 {
        40.0
    }

    fn default_link_strength() -> f32 {
        0.15
    }

    fn default_charge_strength() -> f32 {
        -40.0
    }

    fn default_anchor_strength() -> f32 {
        0.6
    }

    fn default_velocity_decay() -> f32 {
        0.4
    }

    fn default_theta() -> f32 {
        0.9
    }

    fn default_charge_distance_min() -> f32 {
        1.0
    }

    fn default_alpha_min() -> f32 {
        0.001
    }

    fn default_alpha_decay() -> f32 {
        // Decay rate that walks alpha from 1.0 to the floor in ~300 ticks.
        1.0 - 0.001_f32.powf(1.0 / 300.0)
    }

    fn default_drag_alpha_target() -> f32 {
        0.3
    }

    fn rounded(mut self) -> Self {
        self.link_distance = round_f32(self.link_distance);
        self.link_strength = round_f32(self.link_strength);
        self.charge_strength = round_f32(self.charge_strength);
        self.anchor_strength = round_f32(self.anchor_strength);
        self.velocity_decay = round_f32(self.velocity_decay);
        self.theta = round_f32(self.theta);
        self.charge_distance_min = round_f32(self.charge_distance_min);
        self.alpha_min = round_f32(self.alpha_min);
        self.alpha_decay = round_f32(self.alpha_decay);
        self.drag_alpha_target = round_f32(self.drag_alpha_target);
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            link_distance: Self::default_link_distance(),
            link_strength: Self::default_link_strength(),
            charge_strength: Self::default_charge_strength(),
            anchor_strength: Self::default_anchor_strength(),
            velocity_decay: Self::default_velocity_decay(),
            theta: Self::default_theta(),
            charge_distance_min: Self::default_charge_distance_min(),
            alpha_min: Self::default_alpha_min(),
            alpha_decay: Self::default_alpha_decay(),
            drag_alpha_target: Self::default_drag_alpha_target(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Scores at or below this render as "not relevant" in overlays.
    #[serde(default = "EncodingConfig::default_relevance_threshold")]
    pub relevance_threshold: f32,
    /// Minimum name similarity for a listener genre to claim an atlas genre.
    #[serde(default = "EncodingConfig::default_matcher_acceptance")]
    pub matcher_acceptance: f32,
}

impl EncodingConfig {
    fn default_relevance_threshold() -> f32 {
        0.1
    }

    fn default_matcher_acceptance() -> f32 {
        0.2
    }

    fn rounded(mut self) -> Self {
        self.relevance_threshold = round_f32(self.relevance_threshold);
        self.matcher_acceptance = round_f32(self.matcher_acceptance);
        self
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: Self::default_relevance_threshold(),
            matcher_acceptance: Self::default_matcher_acceptance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered with the application; the authorization
    /// code pasted into the UI must have been issued for this URI.
    #[serde(default = "SpotifyConfig::default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "SpotifyConfig::default_api_base")]
    pub api_base: String,
    #[serde(default = "SpotifyConfig::default_accounts_base")]
    pub accounts_base: String,
    #[serde(default = "SpotifyConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SpotifyConfig {
    fn default_redirect_uri() -> String {
        "http://127.0.0.1:8888/callback".to_owned()
    }

    fn default_api_base() -> String {
        "https://api.spotify.com/v1".to_owned()
    }

    fn default_accounts_base() -> String {
        "https://accounts.spotify.com".to_owned()
    }

    fn default_timeout_secs() -> u64 {
        10
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: Self::default_redirect_uri(),
            api_base: Self::default_api_base(),
            accounts_base: Self::default_accounts_base(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the shared profile service. Empty keeps profiles
    /// in process memory, which still allows same-session comparisons.
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "StoreConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl StoreConfig {
    fn default_timeout_secs() -> u64 {
        10
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Override for the session file location. Empty picks a path under
    /// the platform config directory.
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub encoding: EncodingConfig,
    pub spotify: SpotifyConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Loads the config file, falling back to defaults on a parse error.
    /// When the file does not exist yet, writes a fully commented default
    /// so every knob is discoverable without being set.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(raw) => match toml::from_str(&raw) {
                    Ok(config) => return config,
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "config file is invalid; using defaults");
                    }
                },
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "config file is unreadable; using defaults");
                }
            }
            return Self::default();
        }

        let config = Self::default();
        if let Err(error) = config.write_commented_defaults(path) {
            tracing::warn!(path = %path.display(), %error, "could not write default config");
        }
        config
    }

    fn write_commented_defaults(&self, path: &Path) -> std::io::Result<()> {
        let rounded = Self {
            simulation: self.simulation.rounded(),
            encoding: self.encoding.rounded(),
            spotify: self.spotify.clone(),
            store: self.store.clone(),
            session: self.session.clone(),
        };
        let rendered = toml::to_string_pretty(&rounded)
            .map_err(|error| std::io::Error::new(std::io::ErrorKind::InvalidData, error))?;

        let mut commented = String::with_capacity(rendered.len() + 256);
        for line in rendered.lines() {
            if line.trim().is_empty() || line.trim_start().starts_with('[') {
                commented.push_str(line);
            } else {
                commented.push_str("# ");
                commented.push_str(line);
            }
            commented.push('\n');
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, commented)
    }
}

/// Rounds to six decimals so the written defaults stay readable instead
/// of carrying float conversion noise.
fn round_f32(value: f32) -> f32 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_writes_commented_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genre-atlas.toml");
        let config = AppConfig::load_or_default(&path);
        assert!((config.simulation.link_distance - 40.0).abs() < f32::EPSILON);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[simulation]"));
        assert!(written.contains("# link_distance"));
        // Every non-section line must be commented out.
        for line in written.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('[') {
                continue;
            }
            assert!(trimmed.starts_with('#'), "uncommented default line: {line}");
        }
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genre-atlas.toml");
        std::fs::write(&path, "[simulation]\nlink_distance = 55.0\n").unwrap();

        let config = AppConfig::load_or_default(&path);
        assert!((config.simulation.link_distance - 55.0).abs() < f32::EPSILON);
        assert!((config.simulation.link_strength - 0.15).abs() < f32::EPSILON);
        assert!((config.encoding.relevance_threshold - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genre-atlas.toml");
        std::fs::write(&path, "simulation = \"not a table\"\n").unwrap();

        let config = AppConfig::load_or_default(&path);
        assert!((config.encoding.matcher_acceptance - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn alpha_decay_settles_in_roughly_three_hundred_ticks() {
        let config = SimulationConfig::default();
        let mut alpha = 1.0_f32;
        let mut ticks = 0;
        while alpha >= config.alpha_min && ticks < 400 {
            alpha += (0.0 - alpha) * config.alpha_decay;
            ticks += 1;
        }
        assert!((295..=305).contains(&ticks), "settled in {ticks} ticks");
    }
}
