//! Canvas rendering for features, buffer circles and popups.
//!
//! Everything is drawn in layers: background, feature outlines, buffer circles,
//! then the popup and status overlays on top.

use super::state::{CityBuffersApp, Popup};
use crate::constants::{
    BUFFER_FILL, BUFFER_FILL_OPACITY, BUFFER_STROKE, BUFFER_STROKE_OPACITY, BUFFER_STROKE_WIDTH,
    FEATURE_COLOR, FEATURE_STROKE_WIDTH, POINT_DOT_RADIUS,
};
use crate::layer::feature_visible;
use crate::state::LoadStatus;
use crate::types::LatLng;
use eframe::egui;
use eframe::epaint::StrokeKind;

impl CityBuffersApp {
    /// Renders the whole map into `viewport`.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `viewport` - The screen-space rectangle of the canvas area
    pub fn render_map(&self, painter: &egui::Painter, viewport: egui::Rect) {
        let background = if self.preferences.dark_mode {
            egui::Color32::from_gray(24)
        } else {
            egui::Color32::from_gray(236)
        };
        painter.rect_filled(viewport, 0.0, background);

        if let Some(dataset) = &self.dataset {
            let bounds = self.view.bounds(viewport.size());
            for feature in dataset
                .features
                .iter()
                .filter(|feature| feature_visible(feature, &bounds))
            {
                if let Some(geometry) = &feature.geometry {
                    self.draw_geometry(painter, geometry);
                }
            }
        }

        self.draw_buffer_circles(painter);

        if let Some(popup) = &self.popup {
            self.draw_popup(painter, popup);
        }

        self.draw_status_overlay(painter, viewport);
    }

    fn draw_geometry(&self, painter: &egui::Painter, geometry: &geo::Geometry<f64>) {
        let stroke = egui::Stroke::new(FEATURE_STROKE_WIDTH, FEATURE_COLOR);
        match geometry {
            geo::Geometry::Point(point) => self.draw_point(painter, point),
            geo::Geometry::MultiPoint(points) => {
                for point in points {
                    self.draw_point(painter, point);
                }
            }
            geo::Geometry::Line(line) => {
                let points = vec![self.coord_to_screen(line.start), self.coord_to_screen(line.end)];
                painter.add(egui::Shape::line(points, stroke));
            }
            geo::Geometry::LineString(line) => self.draw_line(painter, line, stroke),
            geo::Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.draw_line(painter, line, stroke);
                }
            }
            geo::Geometry::Polygon(polygon) => self.draw_polygon(painter, polygon, stroke),
            geo::Geometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    self.draw_polygon(painter, polygon, stroke);
                }
            }
            geo::Geometry::Rect(rect) => self.draw_polygon(painter, &rect.to_polygon(), stroke),
            geo::Geometry::Triangle(triangle) => {
                self.draw_polygon(painter, &triangle.to_polygon(), stroke)
            }
            geo::Geometry::GeometryCollection(collection) => {
                for member in collection {
                    self.draw_geometry(painter, member);
                }
            }
        }
    }

    fn coord_to_screen(&self, coord: geo::Coord<f64>) -> egui::Pos2 {
        self.latlng_to_screen(LatLng::from(coord))
    }

    fn draw_point(&self, painter: &egui::Painter, point: &geo::Point<f64>) {
        painter.circle_filled(self.coord_to_screen(point.0), POINT_DOT_RADIUS, FEATURE_COLOR);
    }

    fn draw_line(&self, painter: &egui::Painter, line: &geo::LineString<f64>, stroke: egui::Stroke) {
        let points: Vec<egui::Pos2> = line.coords().map(|c| self.coord_to_screen(*c)).collect();
        if points.len() >= 2 {
            painter.add(egui::Shape::line(points, stroke));
        }
    }

    fn draw_polygon(&self, painter: &egui::Painter, polygon: &geo::Polygon<f64>, stroke: egui::Stroke) {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let mut points: Vec<egui::Pos2> =
                ring.coords().map(|c| self.coord_to_screen(*c)).collect();
            // Closed rings repeat their first position
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            if points.len() >= 2 {
                painter.add(egui::Shape::closed_line(points, stroke));
            }
        }
    }

    /// Draws every circle of the buffer layer.
    fn draw_buffer_circles(&self, painter: &egui::Painter) {
        let fill = BUFFER_FILL.gamma_multiply(BUFFER_FILL_OPACITY);
        let stroke = egui::Stroke::new(
            BUFFER_STROKE_WIDTH,
            BUFFER_STROKE.gamma_multiply(BUFFER_STROKE_OPACITY),
        );
        for circle in self.buffer_layer.circles() {
            painter.circle(self.latlng_to_screen(circle.center), circle.radius_px, fill, stroke);
        }
    }

    /// Draws a popup box just above its anchor.
    fn draw_popup(&self, painter: &egui::Painter, popup: &Popup) {
        let anchor = self.latlng_to_screen(popup.anchor);
        let (fill, text_color) = if self.preferences.dark_mode {
            (egui::Color32::from_gray(48), egui::Color32::from_gray(230))
        } else {
            (egui::Color32::WHITE, egui::Color32::from_gray(30))
        };

        let galley =
            painter.layout_no_wrap(popup.label.clone(), egui::FontId::proportional(14.0), text_color);
        let padding = egui::vec2(8.0, 6.0);
        let size = galley.size() + padding * 2.0;
        let rect = egui::Rect::from_min_size(
            egui::pos2(anchor.x - size.x / 2.0, anchor.y - size.y - 10.0),
            size,
        );

        painter.rect_filled(rect, 4.0, fill);
        painter.rect_stroke(
            rect,
            4.0,
            egui::Stroke::new(1.0, egui::Color32::from_gray(120)),
            StrokeKind::Inside,
        );
        painter.line_segment(
            [egui::pos2(anchor.x, rect.max.y), anchor],
            egui::Stroke::new(1.0, egui::Color32::from_gray(120)),
        );
        painter.galley(rect.min + padding, galley, text_color);
    }

    /// Draws the loading indicator or the error banner of the latest request.
    fn draw_status_overlay(&self, painter: &egui::Painter, viewport: egui::Rect) {
        let (text, fill) = match &self.viewer.status {
            LoadStatus::Loading => (
                "Loading…".to_string(),
                egui::Color32::from_rgba_unmultiplied(0, 0, 0, 160),
            ),
            LoadStatus::Failed(message) => (
                format!("Failed to load dataset: {message}"),
                egui::Color32::from_rgba_unmultiplied(160, 30, 30, 220),
            ),
            LoadStatus::Idle | LoadStatus::Ready => return,
        };

        let galley =
            painter.layout_no_wrap(text, egui::FontId::proportional(14.0), egui::Color32::WHITE);
        let padding = egui::vec2(10.0, 6.0);
        let size = galley.size() + padding * 2.0;
        let rect = egui::Rect::from_min_size(
            egui::pos2(viewport.center().x - size.x / 2.0, viewport.min.y + 12.0),
            size,
        );
        painter.rect_filled(rect, 4.0, fill);
        painter.galley(rect.min + padding, galley, egui::Color32::WHITE);
    }
}
