use eframe::egui::{self, Ui};

use super::super::ViewModel;

const SLIDER_REHEAT_ALPHA: f32 = 0.3;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (label or id)")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the layout.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();

        let mut simulation = self.config.simulation;
        let mut changed = false;

        changed |= ui
            .add(
                egui::Slider::new(&mut simulation.charge_strength, -600.0..=-10.0)
                    .text("Charge"),
            )
            .on_hover_text("Many-body strength; more negative spreads nodes further apart.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut simulation.link_distance, 5.0..=200.0).text("Link distance"))
            .on_hover_text("Base rest length; heavier links rest closer than this plus the spread.")
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut simulation.link_distance_spread, 0.0..=100.0)
                    .text("Weight spread"),
            )
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut simulation.velocity_decay, 0.1..=0.95)
                    .text("Velocity retention"),
            )
            .on_hover_text("Share of velocity kept after each tick.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut simulation.center_strength, 0.0..=0.5).text("Centering"))
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut simulation.collision_strength, 0.0..=1.0)
                    .text("Collision"),
            )
            .changed();

        if changed {
            self.config.simulation = simulation;
            self.sim.set_config(simulation);
            self.sim.reheat(SLIDER_REHEAT_ALPHA);
        }

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if self.sim.is_running() {
                if ui.button("Pause").clicked() {
                    self.sim.stop();
                }
            } else if ui.button("Resume").clicked() {
                self.sim.restart();
            }
            if ui.button("Reheat").clicked() {
                self.sim.reheat(1.0);
            }
            if ui
                .add_enabled(self.drags.active_drags() > 0, egui::Button::new("Release pins"))
                .clicked()
            {
                self.dragged = None;
                self.drags.release_all(&mut self.sim);
            }
            if ui.button("Reset view").clicked() {
                self.pan = egui::Vec2::ZERO;
                self.zoom = 1.0;
            }
        });

        ui.add_space(8.0);
        ui.small("Drag a node to pin it; drag the background to pan; scroll to zoom.");
    }
}
