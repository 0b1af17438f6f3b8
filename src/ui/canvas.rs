//! Map canvas interaction and navigation functionality.
//!
//! This module handles panning, zooming, feature picking and the redraw of the
//! buffer layer after the view changes.

use super::state::{CityBuffersApp, Popup};
use crate::constants::{
    MAX_ZOOM, MIN_ZOOM, POINT_HIT_RADIUS, SCROLL_ZOOM_STEP, VIEWPORT_PADDING,
};
use crate::state::Action;
use crate::types::{CityFeature, LatLng};
use eframe::egui;
use geo::Contains;

impl CityBuffersApp {
    /// Converts a coordinate to its position on the canvas.
    pub fn latlng_to_screen(&self, position: LatLng) -> egui::Pos2 {
        self.view.to_screen(position, self.canvas.viewport)
    }

    /// Converts a canvas position to a coordinate.
    pub fn screen_to_latlng(&self, screen_pos: egui::Pos2) -> LatLng {
        self.view.to_latlng(screen_pos, self.canvas.viewport)
    }

    /// Handles primary-button dragging to pan the map, and clicks.
    ///
    /// Releasing the button after moving the map fires a view change ("moveend").
    /// A press and release without a drag is a click, which opens or closes a
    /// feature popup.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_map_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if ui.input(|i| i.pointer.primary_down()) {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if let Some(last_pos) = self.canvas.last_pointer_pos {
                    let delta = current_pos - last_pos;
                    if delta != egui::Vec2::ZERO {
                        self.view.pan_by(delta);
                        self.canvas.is_panning = true;
                    }
                }
                self.canvas.last_pointer_pos = Some(current_pos);
            }
        } else {
            self.canvas.last_pointer_pos = None;
            if std::mem::take(&mut self.canvas.is_panning) {
                self.dispatch(Action::ViewChanged, ui.ctx());
            }
        }

        if response.clicked() {
            let click_pos = response
                .interact_pointer_pos()
                .or_else(|| ui.input(|i| i.pointer.interact_pos()));
            if let Some(click_pos) = click_pos {
                self.handle_map_click(click_pos);
            }
        }
    }

    /// Handles scroll wheel zooming about the cursor.
    ///
    /// Wheel travel is accumulated so that one notch moves exactly one zoom level.
    pub fn handle_map_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll == 0.0 {
            return;
        }
        let Some(pointer) = ui.input(|i| i.pointer.hover_pos()) else {
            return;
        };
        // Only zoom if the cursor is over the canvas
        if !response.rect.contains(pointer) {
            return;
        }

        self.canvas.scroll_accumulator += scroll;
        if self.canvas.scroll_accumulator.abs() >= SCROLL_ZOOM_STEP {
            let step = if self.canvas.scroll_accumulator > 0.0 { 1 } else { -1 };
            self.canvas.scroll_accumulator = 0.0;
            self.zoom_step(step, pointer, ui.ctx());
        }
    }

    /// Zooms in (`step > 0`) or out by whole levels, keeping `anchor` fixed.
    ///
    /// Fires a view change ("zoomend") when the zoom actually changed.
    pub fn zoom_step(&mut self, step: i32, anchor: egui::Pos2, ctx: &egui::Context) {
        let target =
            (i32::from(self.view.zoom) + step).clamp(i32::from(MIN_ZOOM), i32::from(MAX_ZOOM));
        let Ok(target) = u8::try_from(target) else {
            return;
        };
        if self.view.zoom_around(target, anchor, self.canvas.viewport) {
            self.dispatch(Action::ViewChanged, ctx);
        }
    }

    /// Rebuilds the buffer layer for the current view and selected radius.
    pub fn redraw_circles(&mut self) {
        match &self.dataset {
            Some(dataset) => {
                let bounds = self.view.bounds(self.canvas.viewport.size());
                self.buffer_layer.rebuild(
                    dataset,
                    bounds,
                    VIEWPORT_PADDING,
                    self.view.zoom,
                    self.viewer.radius,
                );
            }
            None => self.buffer_layer.clear(),
        }
    }

    /// Finds the topmost feature under a canvas position.
    ///
    /// Polygons are hit from inside; points within [`POINT_HIT_RADIUS`] pixels.
    /// Line features cannot be picked.
    pub fn find_feature_at(&self, screen_pos: egui::Pos2) -> Option<&CityFeature> {
        let dataset = self.dataset.as_ref()?;
        let position = geo::Point::from(self.screen_to_latlng(screen_pos));
        dataset.features.iter().rev().find(|feature| {
            feature
                .geometry
                .as_ref()
                .is_some_and(|geometry| self.geometry_hit(geometry, position, screen_pos))
        })
    }

    fn geometry_hit(
        &self,
        geometry: &geo::Geometry<f64>,
        position: geo::Point<f64>,
        screen_pos: egui::Pos2,
    ) -> bool {
        let near = |point: &geo::Point<f64>| {
            let on_screen = self.latlng_to_screen(LatLng::from(point.0));
            (on_screen - screen_pos).length() <= POINT_HIT_RADIUS
        };
        match geometry {
            geo::Geometry::Point(point) => near(point),
            geo::Geometry::MultiPoint(points) => points.iter().any(near),
            geo::Geometry::Polygon(polygon) => polygon.contains(&position),
            geo::Geometry::MultiPolygon(polygons) => polygons.contains(&position),
            geo::Geometry::Rect(rect) => rect.contains(&position),
            geo::Geometry::GeometryCollection(collection) => collection
                .iter()
                .any(|member| self.geometry_hit(member, position, screen_pos)),
            _ => false,
        }
    }

    /// Opens the popup of the feature under `screen_pos`, or closes the popup.
    fn handle_map_click(&mut self, screen_pos: egui::Pos2) {
        self.popup = self.find_feature_at(screen_pos).map(|feature| {
            let anchor = match &feature.geometry {
                Some(geo::Geometry::Point(point)) => LatLng::from(point.0),
                _ => self.screen_to_latlng(screen_pos),
            };
            Popup {
                anchor,
                label: feature.popup_label(),
            }
        });
    }
}
