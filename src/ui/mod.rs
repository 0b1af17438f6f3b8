//! User interface components and rendering logic for the city buffer map.
//!
//! This module contains the main application struct, the toolbar with the city
//! and radius selectors, the status bar, and the map canvas.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main CityBuffersApp
//! - `loader` - Async dataset requests for native and WASM
//! - `canvas` - Map navigation, zooming, panning, and feature picking
//! - `rendering` - Drawing features, buffer circles, popups and overlays

mod canvas;
mod loader;
mod rendering;
mod state;

pub use loader::{DatasetFetcher, FetchRequest, LoadOutcome, LoaderMessage};
pub use state::{CityBuffersApp, Popup, UiPreferences};

use self::state::PREFERENCES_KEY;
use crate::constants::MAX_ZOOM;
use crate::state::{radius_option_states, reduce, Action, Command, LoadStatus};
use eframe::egui;

impl eframe::App for CityBuffersApp {
    /// Persist UI preferences between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.preferences.to_json() {
            Ok(json) => storage.set_string(PREFERENCES_KEY, json),
            Err(err) => log::error!("failed to serialize preferences: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// Applies finished dataset requests, then lays out the toolbar, the status
    /// bar and the map canvas.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme visuals
        let visuals = if self.preferences.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        // The first catalog entry loads on startup
        if !self.started {
            self.started = true;
            self.select_dataset(0, ctx);
        }

        self.handle_loader_messages(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });
    }
}

impl CityBuffersApp {
    /// Runs `action` through the reducer and executes the resulting commands.
    pub fn dispatch(&mut self, action: Action, ctx: &egui::Context) {
        let (next, commands) = reduce(&self.viewer, action);
        self.viewer = next;
        for command in commands {
            self.execute(command, ctx);
        }
        ctx.request_repaint();
    }

    fn execute(&mut self, command: Command, ctx: &egui::Context) {
        match command {
            Command::ClearDataset => {
                self.dataset = None;
                self.buffer_layer.clear();
                self.popup = None;
            }
            Command::Fetch {
                generation,
                location,
                label,
                catalog_index,
            } => {
                let request = FetchRequest {
                    generation,
                    location,
                    label,
                    catalog_index,
                };
                self.loader
                    .fetcher
                    .fetch(request, self.loader.sender.clone(), ctx);
            }
            Command::PickFile { generation } => {
                self.loader
                    .fetcher
                    .pick_file(generation, self.loader.sender.clone(), ctx);
            }
            Command::InstallDataset => {
                self.dataset = self.loader.staged.take();
            }
            Command::FitBounds => {
                match self.dataset.as_ref().and_then(|dataset| dataset.bounds) {
                    Some(bounds) => {
                        self.view
                            .fit_bounds(bounds, self.canvas.viewport.size(), MAX_ZOOM)
                    }
                    None => log::warn!("dataset has no geometry to fit the view to"),
                }
            }
            Command::Redraw => self.redraw_circles(),
        }
    }

    /// Requests the catalog dataset at `index`.
    pub fn select_dataset(&mut self, index: usize, ctx: &egui::Context) {
        let Some(source) = self.config.datasets.get(index).cloned() else {
            log::warn!("no dataset at catalog index {index}");
            return;
        };
        self.dispatch(Action::SelectDataset { index, source }, ctx);
    }

    /// Renders the top toolbar with the city selector, radius options and view controls.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        ui.horizontal(|ui| {
            // City selection
            let mut chosen = None;
            let selected_text = self
                .viewer
                .active_label
                .clone()
                .unwrap_or_else(|| "Select a city".to_string());
            egui::ComboBox::from_id_salt("city_select")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (index, source) in self.config.datasets.iter().enumerate() {
                        let is_selected = self.viewer.selected_dataset == Some(index);
                        if ui.selectable_label(is_selected, &source.label).clicked() {
                            chosen = Some(index);
                        }
                    }
                });
            if let Some(index) = chosen {
                let retry = matches!(self.viewer.status, LoadStatus::Failed(_));
                if self.viewer.selected_dataset != Some(index) || retry {
                    self.select_dataset(index, &ctx);
                }
            }

            if ui.button("Open file…").clicked() {
                self.dispatch(Action::OpenLocalFile, &ctx);
            }

            ui.separator();

            // Buffer radius options
            ui.label("Buffer:");
            for (radius, active) in radius_option_states(&self.viewer) {
                let clicked = ui
                    .push_id(radius.meters(), |ui| ui.radio(active, radius.to_string()))
                    .inner
                    .clicked();
                if clicked && !active {
                    self.dispatch(Action::SelectRadius(radius), &ctx);
                }
            }

            ui.separator();

            // Zoom controls
            let center = self.canvas.viewport.center();
            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.zoom_step(-1, center, &ctx);
            }
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.zoom_step(1, center, &ctx);
            }

            ui.separator();
            ui.checkbox(&mut self.preferences.dark_mode, "Dark Mode");
        });
    }

    /// Renders the status bar: request progress, counts and zoom level.
    fn draw_status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match &self.viewer.status {
                LoadStatus::Idle => {
                    ui.label("No dataset loaded");
                }
                LoadStatus::Loading => {
                    ui.spinner();
                    ui.label(format!(
                        "Loading {}…",
                        self.viewer.active_label.as_deref().unwrap_or("dataset")
                    ));
                }
                LoadStatus::Ready => {
                    let label = self.viewer.active_label.as_deref().unwrap_or("Dataset");
                    let (features, markers) = self
                        .dataset
                        .as_ref()
                        .map(|d| (d.features.len(), d.marker_count()))
                        .unwrap_or_default();
                    ui.label(format!(
                        "{label}: {features} features, {markers} markers, {} circles in view",
                        self.buffer_layer.len()
                    ));
                }
                LoadStatus::Failed(message) => {
                    ui.colored_label(ui.visuals().error_fg_color, format!("Load failed: {message}"));
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("Zoom: {}", self.view.zoom));
                ui.label(format!("Radius: {}", self.viewer.radius));
            });
        });
    }

    /// Allocates the map canvas, handles its input and renders it.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        // A resized canvas shows a different area, so the circles are rebuilt
        if response.rect != self.canvas.viewport {
            let resized = response.rect.size() != self.canvas.viewport.size();
            self.canvas.viewport = response.rect;
            if resized {
                self.dispatch(Action::ViewChanged, ui.ctx());
            }
        }

        // Handle dragging to pan, and clicks on features
        self.handle_map_panning(ui, &response);

        // Handle scroll wheel zooming
        self.handle_map_zoom(ui, &response);

        self.render_map(&painter, response.rect);
    }
}
