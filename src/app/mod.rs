use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Context, Vec2};

use crate::data::{DataSource, EntityGraph, LoadedGraph, load_graph};
use crate::sim::Simulation;

mod controls;
mod details;
mod interaction;
mod render_utils;
mod view;

pub struct GraphViewerApp {
    endpoint: Option<String>,
    timeout: Duration,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: EntityGraph,
    source: DataSource,
    sim: Simulation,
    pan: Vec2,
    zoom: f32,
    selected: Option<usize>,
    search: String,
    drag_node: Option<DragState>,
    last_viewport: Option<Vec2>,
}

struct DragState {
    index: usize,
    grab_offset: Vec2,
}

impl ViewModel {
    fn new(loaded: LoadedGraph, ctx: &Context) -> Self {
        let mut sim = Simulation::new(&loaded.graph);
        let repaint_ctx = ctx.clone();
        sim.set_tick_observer(move || repaint_ctx.request_repaint());

        Self {
            graph: loaded.graph,
            source: loaded.source,
            sim,
            pan: Vec2::ZERO,
            zoom: 1.0,
            selected: None,
            search: String::new(),
            drag_node: None,
            last_viewport: None,
        }
    }

    // Mirrors what a graph rebuild keeps: surviving nodes stay where they
    // were, and the view and selection follow them by id.
    fn carry_over(&mut self, previous: &ViewModel) {
        for (index, node) in self.graph.nodes.iter().enumerate() {
            if let Some(old_index) = previous.graph.index_of(&node.id) {
                self.sim
                    .set_position(index, previous.sim.nodes()[old_index].pos);
            }
        }

        if let Some(selected) = previous.selected
            && let Some(record) = previous.graph.nodes.get(selected)
        {
            self.selected = self.graph.index_of(&record.id);
        }

        self.pan = previous.pan;
        self.zoom = previous.zoom;
        self.search = previous.search.clone();
    }

    fn source_label(&self) -> String {
        match &self.source {
            DataSource::Remote { endpoint } => format!("data: {endpoint}"),
            DataSource::Fallback => "data: built-in sample".to_owned(),
        }
    }

    fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("relagraph");
                    ui.separator();
                    ui.label(self.source_label());
                    ui.label(format!("nodes: {}", self.graph.node_count()));
                    ui.label(format!("links: {}", self.graph.link_count()));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_controls(ui));

        if self.selected.is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}

impl GraphViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Self {
        let state = Self::start_load(endpoint.clone(), timeout);
        Self {
            endpoint,
            timeout,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Receiver<Result<LoadedGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result =
                load_graph(endpoint.as_deref(), timeout).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(endpoint: Option<String>, timeout: Duration) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(endpoint, timeout),
        }
    }
}

impl eframe::App for GraphViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(loaded) => AppState::Ready(Box::new(ViewModel::new(loaded, ctx))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading entity graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load entity graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.endpoint.clone(), self.timeout));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.endpoint.clone(), self.timeout));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(loaded) => {
                                    let mut next = ViewModel::new(loaded, ctx);
                                    next.carry_over(model);
                                    AppState::Ready(Box::new(next))
                                }
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint_after(Duration::from_millis(100));
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
