use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui::{self, Align, Context, Layout, Vec2};
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::warn;

use crate::atlas::GenreAtlas;
use crate::config::AppConfig;
use crate::profile::types::TimeRange;
use crate::spotify::SpotifyClient;
use crate::store::{
    FileSessionStore, MemoryProfileStore, MemorySessionStore, ProfileStore, RestProfileStore,
    SessionStore,
};

use super::super::ViewModel;
use super::super::camera::Camera;
use super::super::physics::Simulation;

/// Session file from the config, falling back to the per-user default
/// location when the field is left empty.
fn session_path(configured: &str) -> Option<PathBuf> {
    let configured = configured.trim();
    if configured.is_empty() {
        FileSessionStore::default_path()
    } else {
        Some(PathBuf::from(configured))
    }
}

impl ViewModel {
    pub(in crate::app) fn new(atlas: GenreAtlas, config: &AppConfig) -> Self {
        let lowered_ids = atlas
            .nodes
            .iter()
            .map(|node| node.id.to_lowercase())
            .collect();
        let sim = Simulation::new(&atlas);

        let profile_store: Arc<dyn ProfileStore> = if config.store.base_url.trim().is_empty() {
            Arc::new(MemoryProfileStore::default())
        } else {
            Arc::new(RestProfileStore::new(&config.store))
        };

        let session_store: Box<dyn SessionStore> = match session_path(&config.session.file) {
            Some(path) => Box::new(FileSessionStore::open(path)),
            None => {
                warn!("no config directory found; session will not survive restarts");
                Box::new(MemorySessionStore::default())
            }
        };

        let mut model = Self {
            lowered_ids,
            sim,
            atlas,
            tuning: config.simulation,
            encoding: config.encoding,
            camera: Camera::default(),
            camera_initialized: false,
            canvas_size: Vec2::ZERO,
            live_physics: true,
            search: String::new(),
            search_matcher: SkimMatcherV2::default(),
            selected: None,
            hovered: None,
            dragged: None,
            time_range: TimeRange::default(),
            auth_code: String::new(),
            compare_input: String::new(),
            status: None,
            profile: None,
            own_scores: None,
            friend_profile: None,
            friend_scores: None,
            comparing: false,
            overlap: None,
            generation: 0,
            access_token: None,
            refresh_token: None,
            session_store,
            profile_store,
            spotify: SpotifyClient::new(config.spotify.clone()),
            auth_job: None,
            profile_job: None,
            friend_job: None,
            show_fps: false,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        };
        model.restore_session();
        model
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.poll_jobs();
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("genre atlas");
                    ui.separator();
                    ui.label(format!("genres: {}", self.atlas.node_count()));
                    ui.label(format!("links: {}", self.atlas.link_count()));
                    if let Some(profile) = &self.profile {
                        ui.separator();
                        ui.label(format!("listening as {}", profile.display_name));
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        if let Some(status) = &self.status {
                            ui.label(status.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.draw_controls(ui));
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.draw_details(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}
