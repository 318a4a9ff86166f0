use eframe::egui::{self, Align, Layout, RichText, Sense, Ui, vec2};

use crate::profile::types::AudioFeatures;
use crate::util::format_percent;

use super::super::ViewModel;
use super::super::encode::with_opacity;

const TOP_GENRE_ROWS: usize = 12;

fn feature_bar(ui: &mut Ui, label: String, fraction: f32) {
    ui.add(egui::ProgressBar::new(fraction.clamp(0.0, 1.0)).text(label));
}

fn unit_bar(ui: &mut Ui, name: &str, value: Option<f32>) {
    if let Some(value) = value {
        feature_bar(ui, format!("{name} {value:.2}"), value);
    }
}

/// Tempo runs in beats per minute and loudness in negative dBFS, so
/// both get their own bar scale.
fn tempo_bar(ui: &mut Ui, tempo: Option<f32>) {
    if let Some(tempo) = tempo {
        feature_bar(ui, format!("Tempo {tempo:.0} bpm"), tempo / 220.0);
    }
}

fn loudness_bar(ui: &mut Ui, loudness: Option<f32>) {
    if let Some(loudness) = loudness {
        feature_bar(ui, format!("Loudness {loudness:.1} dB"), loudness.abs() / 60.0);
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        match self.selected {
            Some(index) => self.draw_genre_details(ui, index),
            None => {
                ui.label("Click a genre on the map, or search for one.");
            }
        }

        ui.separator();

        let mut recenter = None;
        self.draw_profile_summary(ui, &mut recenter);
        if let Some(index) = recenter {
            self.selected = Some(index);
            self.center_on_node(index);
        }
    }

    fn draw_genre_details(&self, ui: &mut Ui, index: usize) {
        let Some(node) = self.atlas.nodes.get(index) else {
            ui.label("Selection no longer exists.");
            return;
        };

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
            ui.painter()
                .circle_filled(rect.center(), 6.0, with_opacity(node.color, 1.0));
            ui.label(RichText::new(&node.id).strong().size(18.0));
        });
        ui.small(format!("{} related genres", self.atlas.degree(index)));
        ui.add_space(4.0);

        if let Some(own) = self.own_scores.as_deref() {
            let score = own.score_at(index);
            if score > 0.0 {
                ui.label(format!("Your match: {}", format_percent(score)));
            } else {
                ui.label("Not in your listening profile.");
            }
        }
        if self.comparing
            && let Some(friend) = self.friend_scores.as_deref()
        {
            let score = friend.score_at(index);
            if score > 0.0 {
                ui.label(format!("Friend match: {}", format_percent(score)));
            }
        }

        if !node.top_artists.is_empty() {
            ui.add_space(6.0);
            ui.label(RichText::new("Representative artists").strong());
            ui.label(node.top_artists.join(", "));
        }

        if let Some(features) = &node.features
            && !features.is_empty()
        {
            ui.add_space(6.0);
            ui.label(RichText::new("Audio character").strong());
            unit_bar(ui, "Energy", features.energy);
            unit_bar(ui, "Danceability", features.danceability);
            unit_bar(ui, "Valence", features.valence);
            unit_bar(ui, "Acousticness", features.acousticness);
            unit_bar(ui, "Instrumentalness", features.instrumentalness);
            unit_bar(ui, "Speechiness", features.speechiness);
            tempo_bar(ui, features.tempo);
            loudness_bar(ui, features.loudness);
        }
    }

    fn draw_profile_summary(&self, ui: &mut Ui, recenter: &mut Option<usize>) {
        let Some(profile) = &self.profile else {
            ui.label("Connect to see where your taste sits on the map.");
            return;
        };

        ui.label(RichText::new(format!("{}'s top genres", profile.display_name)).strong());
        ui.small(profile.time_range.label());
        if profile.features_partial {
            ui.small("Audio features were unavailable for this build.");
        }
        ui.add_space(4.0);

        let Some(own) = self.own_scores.as_deref() else {
            return;
        };
        if own.ranked().is_empty() {
            ui.label("None of your genres matched the atlas.");
        }
        for &(index, score) in own.ranked().iter().take(TOP_GENRE_ROWS) {
            let Some(node) = self.atlas.nodes.get(index) else {
                continue;
            };
            let is_selected = self.selected == Some(index);
            let clicked = ui
                .horizontal(|ui| {
                    let clicked = ui.selectable_label(is_selected, &node.id).clicked();
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format_percent(score));
                    });
                    clicked
                })
                .inner;
            if clicked {
                *recenter = Some(index);
            }
        }

        if !profile.features_partial {
            ui.add_space(6.0);
            ui.label(RichText::new("Your audio character").strong());
            draw_listener_features(ui, &profile.audio_features);
        }
    }
}

fn draw_listener_features(ui: &mut Ui, features: &AudioFeatures) {
    unit_bar(ui, "Energy", Some(features.energy));
    unit_bar(ui, "Danceability", Some(features.danceability));
    unit_bar(ui, "Valence", Some(features.valence));
    unit_bar(ui, "Acousticness", Some(features.acousticness));
    tempo_bar(ui, Some(features.tempo));
    loudness_bar(ui, Some(features.loudness));
}
