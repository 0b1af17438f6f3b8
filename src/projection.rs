//! Web Mercator projection and the map view.
//!
//! World coordinates are pixels at a given integer zoom, with the origin at the
//! north-west corner of the world and `y` growing southwards. They are kept in
//! `f64`: at zoom 18 the world is tens of millions of pixels wide, which `f32`
//! screen coordinates cannot address precisely.

use crate::constants::{DEFAULT_CENTER, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
use crate::types::LatLng;
use eframe::egui;
use std::f64::consts::PI;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Width and height of the world in pixels at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(i32::from(zoom))
}

/// Projects a coordinate to world pixels at `zoom`.
pub fn project(position: LatLng, zoom: u8) -> geo::Coord<f64> {
    let size = world_size(zoom);
    let lat = position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let sin = lat.sin();
    geo::Coord {
        x: (position.lon + 180.0) / 360.0 * size,
        y: (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * size,
    }
}

/// Inverse of [`project`].
pub fn unproject(point: geo::Coord<f64>, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lon = point.x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * point.y / size;
    LatLng::new(n.sinh().atan().to_degrees(), lon)
}

/// Grows `rect` by `ratio` of its width and height on every side.
pub fn pad_rect(rect: geo::Rect<f64>, ratio: f64) -> geo::Rect<f64> {
    let dx = rect.width() * ratio;
    let dy = rect.height() * ratio;
    geo::Rect::new(
        geo::Coord { x: rect.min().x - dx, y: rect.min().y - dy },
        geo::Coord { x: rect.max().x + dx, y: rect.max().y + dy },
    )
}

/// What part of the world is on screen: a center and an integer zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    /// Coordinate shown at the middle of the viewport
    pub center: LatLng,
    /// Integer zoom level within [`MIN_ZOOM`, `MAX_ZOOM`]
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl MapView {
    /// Creates a view, clamping the zoom into the supported range.
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Converts a coordinate to a screen position inside `viewport`.
    pub fn to_screen(&self, position: LatLng, viewport: egui::Rect) -> egui::Pos2 {
        let center = project(self.center, self.zoom);
        let point = project(position, self.zoom);
        viewport.center() + egui::vec2((point.x - center.x) as f32, (point.y - center.y) as f32)
    }

    /// Converts a screen position inside `viewport` to a coordinate.
    pub fn to_latlng(&self, screen_pos: egui::Pos2, viewport: egui::Rect) -> LatLng {
        let center = project(self.center, self.zoom);
        let delta = screen_pos - viewport.center();
        unproject(
            geo::Coord {
                x: center.x + f64::from(delta.x),
                y: center.y + f64::from(delta.y),
            },
            self.zoom,
        )
    }

    /// Moves the map content by `delta` screen pixels.
    pub fn pan_by(&mut self, delta: egui::Vec2) {
        let center = project(self.center, self.zoom);
        self.center = unproject(
            geo::Coord {
                x: center.x - f64::from(delta.x),
                y: center.y - f64::from(delta.y),
            },
            self.zoom,
        );
    }

    /// Changes the zoom level while keeping the coordinate under `anchor` fixed.
    ///
    /// Returns `false` when the clamped zoom equals the current one.
    pub fn zoom_around(&mut self, zoom: u8, anchor: egui::Pos2, viewport: egui::Rect) -> bool {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return false;
        }
        let pinned = self.to_latlng(anchor, viewport);
        let pinned_world = project(pinned, zoom);
        let offset = anchor - viewport.center();
        self.zoom = zoom;
        self.center = unproject(
            geo::Coord {
                x: pinned_world.x - f64::from(offset.x),
                y: pinned_world.y - f64::from(offset.y),
            },
            zoom,
        );
        true
    }

    /// The lon/lat rectangle visible in a viewport of `size` pixels.
    pub fn bounds(&self, size: egui::Vec2) -> geo::Rect<f64> {
        let center = project(self.center, self.zoom);
        let half_w = f64::from(size.x) / 2.0;
        let half_h = f64::from(size.y) / 2.0;
        let north_west = unproject(
            geo::Coord { x: center.x - half_w, y: center.y - half_h },
            self.zoom,
        );
        let south_east = unproject(
            geo::Coord { x: center.x + half_w, y: center.y + half_h },
            self.zoom,
        );
        geo::Rect::new(geo::Coord::from(north_west), geo::Coord::from(south_east))
    }

    /// Centers the view on `bounds` at the highest zoom (up to `max_zoom`) that fits
    /// them inside a viewport of `size` pixels.
    pub fn fit_bounds(&mut self, bounds: geo::Rect<f64>, size: egui::Vec2, max_zoom: u8) {
        let south_west = LatLng::new(bounds.min().y, bounds.min().x);
        let north_east = LatLng::new(bounds.max().y, bounds.max().x);
        let max_zoom = max_zoom.clamp(MIN_ZOOM, MAX_ZOOM);

        let zoom = (MIN_ZOOM..=max_zoom)
            .rev()
            .find(|&zoom| {
                let sw = project(south_west, zoom);
                let ne = project(north_east, zoom);
                (ne.x - sw.x).abs() <= f64::from(size.x) && (sw.y - ne.y).abs() <= f64::from(size.y)
            })
            .unwrap_or(MIN_ZOOM);

        let sw = project(south_west, zoom);
        let ne = project(north_east, zoom);
        self.zoom = zoom;
        self.center = unproject(
            geo::Coord {
                x: (sw.x + ne.x) / 2.0,
                y: (sw.y + ne.y) / 2.0,
            },
            zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn viewport() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    #[test]
    fn origin_projects_to_world_center() {
        let p = project(LatLng::new(0.0, 0.0), 0);
        assert_abs_diff_eq!(p.x, 128.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 128.0, epsilon = 1e-9);
    }

    #[test]
    fn unproject_inverts_project() {
        let position = LatLng::new(44.429283, 26.103541);
        let back = unproject(project(position, 17), 17);
        assert_abs_diff_eq!(back.lat, position.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(back.lon, position.lon, epsilon = 1e-9);
    }

    #[test]
    fn view_center_maps_to_viewport_center() {
        let view = MapView::default();
        let pos = view.to_screen(view.center, viewport());
        assert_eq!(pos, viewport().center());
    }

    #[test]
    fn panning_moves_content_with_the_pointer() {
        let mut view = MapView::default();
        let target = LatLng::new(44.4300, 26.1050);
        let before = view.to_screen(target, viewport());
        view.pan_by(egui::vec2(30.0, -20.0));
        let after = view.to_screen(target, viewport());
        assert!((after.x - before.x - 30.0).abs() < 0.01);
        assert!((after.y - before.y + 20.0).abs() < 0.01);
    }

    #[test]
    fn zoom_around_keeps_anchor_fixed() {
        let mut view = MapView::default();
        let anchor = egui::pos2(600.0, 150.0);
        let pinned = view.to_latlng(anchor, viewport());
        assert!(view.zoom_around(view.zoom - 2, anchor, viewport()));
        let after = view.to_screen(pinned, viewport());
        assert!((after - anchor).length() < 0.01);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = MapView::new(LatLng::new(0.0, 0.0), 40);
        assert_eq!(view.zoom, MAX_ZOOM);
        assert!(!view.zoom_around(MAX_ZOOM + 3, viewport().center(), viewport()));
    }

    #[test]
    fn bounds_contain_center_and_scale_with_zoom() {
        let view = MapView::default();
        let near = view.bounds(viewport().size());
        let far = MapView::new(view.center, view.zoom - 1).bounds(viewport().size());
        assert!(near.min().x < view.center.lon && view.center.lon < near.max().x);
        assert!(near.min().y < view.center.lat && view.center.lat < near.max().y);
        assert_abs_diff_eq!(far.width(), near.width() * 2.0, epsilon = 1e-9);
    }

    #[test]
    fn pad_rect_grows_every_side() {
        let rect = geo::Rect::new(geo::Coord { x: 0.0, y: 0.0 }, geo::Coord { x: 10.0, y: 5.0 });
        let padded = pad_rect(rect, 0.2);
        assert_abs_diff_eq!(padded.min().x, -2.0);
        assert_abs_diff_eq!(padded.max().y, 6.0);
    }

    #[test]
    fn fit_bounds_shows_the_whole_rect() {
        let bounds = geo::Rect::new(
            geo::Coord { x: 26.08, y: 44.42 },
            geo::Coord { x: 26.12, y: 44.44 },
        );
        let mut view = MapView::default();
        view.fit_bounds(bounds, viewport().size(), MAX_ZOOM);
        let visible = view.bounds(viewport().size());
        assert!(visible.min().x <= 26.08 && visible.max().x >= 26.12);
        assert!(visible.min().y <= 44.42 && visible.max().y >= 44.44);

        // One level closer would no longer fit
        let closer = MapView::new(view.center, view.zoom + 1).bounds(viewport().size());
        assert!(closer.width() < bounds.width() || closer.height() < bounds.height());
    }

    #[test]
    fn fit_bounds_of_a_single_point_uses_max_zoom() {
        let point = geo::Coord { x: 26.1, y: 44.4 };
        let mut view = MapView::default();
        view.fit_bounds(geo::Rect::new(point, point), viewport().size(), MAX_ZOOM);
        assert_eq!(view.zoom, MAX_ZOOM);
        assert_abs_diff_eq!(view.center.lon, 26.1, epsilon = 1e-9);
    }
}
