use eframe::egui::{self, Color32, RichText, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;

use crate::profile::types::TimeRange;
use crate::util::format_percent;

use super::super::ViewModel;
use super::super::encode::legend_colors;

const SEARCH_RESULT_LIMIT: usize = 8;
const FRIEND_GENRE_ROWS: usize = 8;

fn legend_row(ui: &mut Ui, color: Color32, text: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
        ui.painter().circle_filled(rect.center(), 5.0, color);
        ui.label(text);
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Atlas Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search_section(ui);
        ui.separator();
        self.draw_account_section(ui);
        ui.separator();
        self.draw_comparison_section(ui);
        ui.separator();
        self.draw_display_section(ui);
    }

    fn draw_search_section(&mut self, ui: &mut Ui) {
        ui.label("Search genres")
            .on_hover_text("Matching genres grow and light up on the map while you type.");
        ui.text_edit_singleline(&mut self.search);

        let query = self.search.trim().to_owned();
        if query.is_empty() {
            return;
        }

        let mut ranked: Vec<(usize, i64)> = self
            .atlas
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                self.search_matcher
                    .fuzzy_match(&node.id, &query)
                    .map(|score| (index, score))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(SEARCH_RESULT_LIMIT);

        let mut picked = None;
        for (index, _) in &ranked {
            let is_selected = self.selected == Some(*index);
            if ui
                .selectable_label(is_selected, &self.atlas.nodes[*index].id)
                .clicked()
            {
                picked = Some(*index);
            }
        }
        if let Some(index) = picked {
            self.selected = Some(index);
            self.center_on_node(index);
        }
    }

    fn draw_account_section(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Account").strong());
        ui.add_space(2.0);

        if self.access_token.is_none() {
            ui.label("Paste the authorization code from the login redirect.");
            ui.text_edit_singleline(&mut self.auth_code);
            let pending = self.auth_job.is_some();
            if ui
                .add_enabled(!pending, egui::Button::new("Connect"))
                .clicked()
            {
                self.connect();
            }
            return;
        }

        match &self.profile {
            Some(profile) => ui.label(format!("Connected as {}", profile.display_name)),
            None => ui.label("Connected"),
        };

        ui.horizontal(|ui| {
            ui.label("History window");
            let previous = self.time_range;
            egui::ComboBox::from_id_salt("time_range")
                .selected_text(self.time_range.label())
                .show_ui(ui, |ui| {
                    for range in TimeRange::ALL {
                        ui.selectable_value(&mut self.time_range, range, range.label());
                    }
                });
            if self.time_range != previous {
                self.refresh_profile();
            }
        });

        ui.horizontal(|ui| {
            let pending = self.profile_job.is_some();
            if ui
                .add_enabled(!pending, egui::Button::new("Refresh profile"))
                .clicked()
            {
                self.refresh_profile();
            }
            if ui.button("Disconnect").clicked() {
                self.disconnect();
            }
        });
    }

    fn draw_comparison_section(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Compare tastes").strong());
        ui.add_space(2.0);

        if self.own_scores.is_none() {
            ui.label("Connect your account to compare with a friend.");
            return;
        }

        ui.label("Friend's user id");
        ui.text_edit_singleline(&mut self.compare_input);
        ui.horizontal(|ui| {
            let pending = self.friend_job.is_some();
            if ui
                .add_enabled(!pending, egui::Button::new("Compare"))
                .clicked()
            {
                self.start_compare();
            }
            if self.comparing && ui.button("Stop comparing").clicked() {
                self.clear_comparison();
            }
        });

        if !self.comparing {
            return;
        }

        if let Some(friend) = &self.friend_profile {
            ui.label(format!("Comparing with {}", friend.display_name));
        }
        if let Some(overlap) = self.overlap {
            ui.label(
                RichText::new(format!("Taste overlap: {overlap}%"))
                    .strong(),
            );
        }

        let (self_color, friend_color, shared_color) = legend_colors();
        legend_row(ui, self_color, "Mostly yours");
        legend_row(ui, friend_color, "Mostly theirs");
        legend_row(ui, shared_color, "Shared ground");

        let shared = self.shared_genre_count();
        ui.label(format!("{shared} genres above the threshold for both"));

        let mut picked = None;
        if let Some(friend) = &self.friend_scores {
            ui.add_space(4.0);
            ui.label("Their top genres");
            for &(index, score) in friend.ranked().iter().take(FRIEND_GENRE_ROWS) {
                let Some(node) = self.atlas.nodes.get(index) else {
                    continue;
                };
                let is_selected = self.selected == Some(index);
                if ui
                    .selectable_label(is_selected, format!("{}  {}", node.id, format_percent(score)))
                    .clicked()
                {
                    picked = Some(index);
                }
            }
        }
        if let Some(index) = picked {
            self.selected = Some(index);
            self.center_on_node(index);
        }
    }

    fn draw_display_section(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Display").strong());
        ui.add_space(2.0);

        ui.checkbox(&mut self.live_physics, "Live simulation")
            .on_hover_text("Keep annealing the layout while viewing.");
        ui.checkbox(&mut self.show_fps, "FPS readout")
            .on_hover_text("Show frame timing in the header.");

        ui.add(
            egui::Slider::new(&mut self.encoding.relevance_threshold, 0.0..=0.5)
                .text("Relevance threshold"),
        )
        .on_hover_text("Scores at or below this count as not part of a taste.");

        if ui.button("Reset view").clicked() {
            self.camera_initialized = false;
        }

        ui.collapsing("Layout tuning", |ui| {
            let mut changed = false;
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.tuning.link_distance, 10.0..=120.0)
                        .text("Link distance"),
                )
                .on_hover_text("Resting length of the springs between related genres.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.tuning.link_strength, 0.0..=1.0)
                        .text("Link strength"),
                )
                .on_hover_text("How firmly related genres pull toward each other.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.tuning.charge_strength, -120.0..=0.0)
                        .text("Charge"),
                )
                .on_hover_text("Negative charge pushes all genres apart.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.tuning.anchor_strength, 0.0..=1.0)
                        .text("Anchor pull"),
                )
                .on_hover_text("How strongly genres return to their taxonomy position.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.tuning.velocity_decay, 0.0..=0.9)
                        .text("Velocity decay"),
                )
                .on_hover_text("Fraction of velocity lost each tick.")
                .changed();
            if changed {
                self.sim.reheat(0.3);
            }
        });
    }

    fn shared_genre_count(&self) -> usize {
        match (&self.own_scores, &self.friend_scores) {
            (Some(own), Some(friend)) => (0..self.atlas.node_count())
                .filter(|&index| {
                    own.score_at(index) > self.encoding.relevance_threshold
                        && friend.score_at(index) > self.encoding.relevance_threshold
                })
                .count(),
            _ => 0,
        }
    }
}
