use eframe::egui::{self, Sense, Ui, vec2};

use crate::data::NodeKind;
use crate::sim::Force;

use super::ViewModel;
use super::render_utils::kind_color;

const REHEAT_ALPHA: f32 = 0.3;

impl ViewModel {
    pub(super) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        ui.add_space(4.0);
        ui.text_edit_singleline(&mut self.search);
        if !self.search.trim().is_empty() && ui.button("Clear search").clicked() {
            self.search.clear();
        }

        ui.add_space(10.0);
        ui.separator();
        ui.heading("Layout forces");
        ui.add_space(4.0);

        for (name, enabled) in self.sim.force_slots() {
            let mut enabled = enabled;
            if ui.checkbox(&mut enabled, name).changed() {
                self.sim.set_force_enabled(name, enabled);
                self.sim.reheat(REHEAT_ALPHA);
            }
        }

        ui.add_space(6.0);
        let mut link_changed = false;
        if let Some(Force::Link(link)) = self.sim.force_mut("link") {
            link_changed = ui
                .add(egui::Slider::new(&mut link.distance, 40.0..=220.0).text("Link distance"))
                .changed();
        }
        if link_changed {
            self.sim.reheat(REHEAT_ALPHA);
        }

        if ui.button("Reheat layout").clicked() {
            self.sim.reheat(0.5);
        }

        ui.add_space(10.0);
        ui.separator();
        ui.heading("Legend");
        ui.add_space(4.0);

        for kind in NodeKind::LEGEND {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
                ui.painter().circle_filled(rect.center(), 5.0, kind_color(kind));
                ui.label(kind.label());
            });
        }

        ui.add_space(10.0);
        ui.separator();
        if self.sim.active() {
            ui.label(format!("layout settling, alpha {:.3}", self.sim.alpha()));
        } else {
            ui.label(format!("layout at rest after {} ticks", self.sim.ticks()));
        }
    }
}
