use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::data::NodeRecord;
use crate::sim::{glyph_radius, label_offset};

use super::ViewModel;
use super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, edge_visible, kind_color,
    world_to_screen,
};

const RESIZE_REHEAT_ALPHA: f32 = 0.3;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn search_matches(&self) -> Option<HashSet<usize>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.name, query)
                    .or_else(|| fuzzy_match_score(&matcher, &node.id, query))
                    .map(|_score| index)
            })
            .collect::<HashSet<_>>();

        Some(matches)
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let viewport = rect.size();
        if let Some(last) = self.last_viewport
            && (last - viewport).length_sq() > 1.0
        {
            self.sim.set_center(self.world_viewport_center());
            self.sim.reheat(RESIZE_REHEAT_ALPHA);
        }
        self.last_viewport = Some(viewport);

        // At most one tick per frame; the tick observer schedules the next
        // frame while the layout is still settling.
        self.sim.step();

        if response.dragged() {
            ui.ctx().request_repaint();
        }

        let pan = self.pan;
        let zoom = self.zoom;
        let screen_positions = self
            .sim
            .nodes()
            .iter()
            .map(|node| world_to_screen(rect, pan, zoom, node.pos))
            .collect::<Vec<_>>();
        let screen_radii = self
            .graph
            .nodes
            .iter()
            .map(|node| (glyph_radius(node.kind) * zoom).clamp(2.0, 160.0))
            .collect::<Vec<_>>();

        let visible_indices = (0..screen_positions.len())
            .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
            .collect::<Vec<_>>();

        let hovered = self.hovered_index(ui, &visible_indices, &screen_positions, &screen_radii);
        let hovered_index = hovered.map(|(index, _distance)| index);

        self.handle_node_drag(ui, rect, &response, hovered_index);

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let pending_selection = if response.clicked_by(egui::PointerButton::Primary) {
            Some(hovered_index)
        } else {
            None
        };

        let matches = self.search_matches();
        let search_active = matches.as_ref().is_some_and(|matches| !matches.is_empty());

        for link in &self.graph.links {
            let start = screen_positions[link.source];
            let end = screen_positions[link.target];
            if !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            let attached_to_selection =
                self.selected == Some(link.source) || self.selected == Some(link.target);
            let (width, color) = if attached_to_selection {
                (2.2, Color32::from_rgb(246, 206, 104))
            } else if search_active || self.selected.is_some() {
                (1.1, Color32::from_rgba_unmultiplied(80, 90, 104, 140))
            } else {
                (1.3, Color32::from_rgba_unmultiplied(110, 118, 128, 180))
            };
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        // Larger glyphs first so small neighbours stay visible on top.
        let mut draw_order = visible_indices.clone();
        draw_order.sort_by(|a, b| screen_radii[*b].total_cmp(&screen_radii[*a]));

        for index in draw_order {
            let record = &self.graph.nodes[index];
            let position = screen_positions[index];
            let radius = screen_radii[index];

            let is_selected = self.selected == Some(index);
            let is_hovered = hovered_index == Some(index);
            let is_match = matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = kind_color(record.kind);
            let color = if is_hovered {
                blend_color(base_color, Color32::from_rgb(255, 164, 101), 0.55)
            } else if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.60)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            let (outline_width, outline_color) = if is_selected {
                (2.4, Color32::from_rgb(245, 206, 93))
            } else {
                (1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(position, radius, Stroke::new(outline_width, outline_color));
            if is_selected {
                painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(1.4, Color32::from_rgba_unmultiplied(245, 206, 93, 120)),
                );
            }

            painter.text(
                position + vec2(0.0, label_offset(record.kind) * zoom),
                Align2::CENTER_CENTER,
                &record.name,
                FontId::proportional(12.0),
                Color32::from_gray(225),
            );
        }

        if let Some(index) = hovered_index
            && self.drag_node.is_none()
            && let Some(pointer) = ui.input(|input| input.pointer.hover_pos())
        {
            draw_node_tooltip(&painter, rect, pointer, &self.graph.nodes[index]);
        }

        if let Some(selection) = pending_selection {
            self.selected = selection;
        }
    }
}

fn draw_node_tooltip(painter: &egui::Painter, rect: Rect, pointer: Pos2, node: &NodeRecord) {
    let name = painter.layout_no_wrap(
        node.name.clone(),
        FontId::proportional(14.0),
        Color32::from_gray(245),
    );
    let kind = painter.layout_no_wrap(
        node.kind.label().to_owned(),
        FontId::proportional(11.0),
        Color32::from_gray(175),
    );
    let description = painter.layout(
        node.description.clone(),
        FontId::proportional(12.0),
        Color32::from_gray(210),
        260.0,
    );

    let padding = 8.0;
    let spacing = 3.0;
    let has_description = !node.description.is_empty();

    let mut width = name.size().x.max(kind.size().x);
    let mut height = name.size().y + spacing + kind.size().y;
    if has_description {
        width = width.max(description.size().x);
        height += spacing + description.size().y;
    }
    width += padding * 2.0;
    height += padding * 2.0;

    let mut anchor = pointer + vec2(14.0, 14.0);
    if anchor.x + width > rect.right() {
        anchor.x = pointer.x - width - 14.0;
    }
    if anchor.y + height > rect.bottom() {
        anchor.y = pointer.y - height - 14.0;
    }

    let tooltip_rect = Rect::from_min_size(anchor, vec2(width, height));
    painter.rect_filled(tooltip_rect, 6.0, Color32::from_rgba_unmultiplied(28, 32, 40, 242));

    let mut cursor = anchor + vec2(padding, padding);
    let name_height = name.size().y;
    painter.galley(cursor, name, Color32::from_gray(245));
    cursor.y += name_height + spacing;

    let kind_height = kind.size().y;
    painter.galley(cursor, kind, Color32::from_gray(175));
    cursor.y += kind_height + spacing;

    if has_description {
        painter.galley(cursor, description, Color32::from_gray(210));
    }
}
