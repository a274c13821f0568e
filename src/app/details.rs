use eframe::egui::{self, RichText, Ui};

use super::ViewModel;

impl ViewModel {
    pub(super) fn draw_details(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Details");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    self.selected = None;
                }
            });
        });
        ui.add_space(6.0);

        let Some(selected) = self.selected else {
            return;
        };
        let Some(node) = self.graph.nodes.get(selected) else {
            self.selected = None;
            return;
        };

        let name = node.name.clone();
        let kind_label = node.kind.label();
        let description = node.description.clone();
        let connections = self.graph.connections_of(selected);

        ui.label(RichText::new(name).strong().size(16.0));
        ui.small(kind_label);
        ui.add_space(6.0);

        if description.is_empty() {
            ui.label("No description available.");
        } else {
            ui.label(description);
        }

        ui.separator();
        if connections.is_empty() {
            ui.label("No connections");
            return;
        }

        ui.label(RichText::new(format!("Connections ({})", connections.len())).strong());
        ui.add_space(4.0);

        let mut next_selection = None;
        egui::ScrollArea::vertical()
            .id_salt("connections_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for connection in &connections {
                    let arrow = if connection.outgoing { "→" } else { "←" };
                    let other_name = self
                        .graph
                        .nodes
                        .get(connection.other)
                        .map(|other| other.name.as_str())
                        .unwrap_or("?");

                    let row = format!("{arrow} {} {other_name}", connection.relationship);
                    if ui.link(row).clicked() {
                        next_selection = Some(connection.other);
                    }
                }
            });

        if next_selection.is_some() {
            self.selected = next_selection;
        }
    }
}
