use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::atlas::{GenreAtlas, load_atlas};
use crate::config::{AppConfig, EncodingConfig, SimulationConfig};
use crate::profile::source::{SourceError, TokenPair};
use crate::profile::types::{TasteProfile, TimeRange};
use crate::spotify::SpotifyClient;
use crate::store::{ProfileStore, SessionStore, StoreError};

mod camera;
mod encode;
mod graph;
mod physics;
mod session;
mod ui;

use self::camera::Camera;
use self::physics::Simulation;
use self::session::Job;

pub struct GenreAtlasApp {
    data_path: PathBuf,
    config: AppConfig,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<GenreAtlas, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    atlas: GenreAtlas,
    /// Lowercased genre names, index-aligned with the atlas, for the
    /// per-frame substring highlight.
    lowered_ids: Vec<String>,
    sim: Simulation,
    tuning: SimulationConfig,
    encoding: EncodingConfig,
    camera: Camera,
    camera_initialized: bool,
    canvas_size: Vec2,
    live_physics: bool,
    search: String,
    search_matcher: SkimMatcherV2,
    selected: Option<usize>,
    hovered: Option<usize>,
    dragged: Option<usize>,
    time_range: TimeRange,
    auth_code: String,
    compare_input: String,
    status: Option<String>,
    profile: Option<Arc<TasteProfile>>,
    own_scores: Option<Arc<ScoreOverlay>>,
    friend_profile: Option<Arc<TasteProfile>>,
    friend_scores: Option<Arc<ScoreOverlay>>,
    comparing: bool,
    overlap: Option<u32>,
    /// Bumped whenever pending background work should be orphaned.
    generation: u64,
    access_token: Option<String>,
    refresh_token: Option<String>,
    session_store: Box<dyn SessionStore>,
    profile_store: Arc<dyn ProfileStore>,
    spotify: SpotifyClient,
    auth_job: Option<Job<Result<TokenPair, SourceError>>>,
    profile_job: Option<Job<Result<ProfileBundle, SourceError>>>,
    friend_job: Option<Job<Result<ProfileBundle, StoreError>>>,
    show_fps: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

/// What a profile worker hands back: the built profile plus its
/// projection onto atlas genre names.
struct ProfileBundle {
    profile: TasteProfile,
    mapped: HashMap<String, f32>,
}

/// A listener's scores resolved against the atlas, in the shapes each
/// consumer wants: by id for overlap math, by index for per-node
/// rendering, ranked for the side panel.
struct ScoreOverlay {
    by_id: HashMap<String, f32>,
    by_index: Vec<f32>,
    ranked: Vec<(usize, f32)>,
}

impl ScoreOverlay {
    fn new(by_id: HashMap<String, f32>, atlas: &GenreAtlas) -> Self {
        let mut by_index = vec![0.0; atlas.node_count()];
        for (id, score) in &by_id {
            if let Some(index) = atlas.index_of(id) {
                by_index[index] = *score;
            }
        }
        let mut ranked: Vec<(usize, f32)> = by_index
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score > 0.0)
            .map(|(index, &score)| (index, score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Self {
            by_id,
            by_index,
            ranked,
        }
    }

    fn score_at(&self, index: usize) -> f32 {
        self.by_index.get(index).copied().unwrap_or(0.0)
    }

    fn by_id(&self) -> &HashMap<String, f32> {
        &self.by_id
    }

    /// Scored atlas indices, highest first.
    fn ranked(&self) -> &[(usize, f32)] {
        &self.ranked
    }
}

impl GenreAtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: PathBuf, config: AppConfig) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            config,
            state,
        }
    }

    fn spawn_load(data_path: PathBuf) -> Receiver<Result<GenreAtlas, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_atlas(&data_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for GenreAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(atlas) => {
                            AppState::Ready(Box::new(ViewModel::new(atlas, &self.config)))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Charting the genre universe...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the genre atlas");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
