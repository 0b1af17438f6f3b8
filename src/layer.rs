//! The buffer layer: circles currently drawn on the map.
//!
//! The layer is rebuilt from scratch on every redraw. Only features near the
//! viewport contribute, and every circle gets the pixel radius for the current
//! zoom and selected buffer distance.

use crate::projection::pad_rect;
use crate::radius::pixel_radius;
use crate::types::{BufferRadius, CityFeature, Dataset, LatLng};
use geo::Intersects;

/// One circle as drawn: a center and an on-screen radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferCircle {
    /// Circle center
    pub center: LatLng,
    /// Radius in screen pixels
    pub radius_px: f32,
}

/// Circles visible after the last redraw.
#[derive(Debug, Clone, Default)]
pub struct BufferLayer {
    circles: Vec<BufferCircle>,
}

impl BufferLayer {
    /// Removes every circle.
    pub fn clear(&mut self) {
        self.circles.clear();
    }

    /// Circles in draw order.
    pub fn circles(&self) -> &[BufferCircle] {
        &self.circles
    }

    /// Number of circles on the layer.
    pub fn len(&self) -> usize {
        self.circles.len()
    }

    /// Whether the layer has no circles.
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Replaces the layer content with the circles of features near `viewport`.
    ///
    /// `viewport` is grown by `padding` of its size on each side before culling,
    /// so circles just off screen are already in place after a short pan.
    pub fn rebuild(
        &mut self,
        dataset: &Dataset,
        viewport: geo::Rect<f64>,
        padding: f64,
        zoom: u8,
        radius: BufferRadius,
    ) {
        self.clear();
        let culling = pad_rect(viewport, padding);
        let radius_px = pixel_radius(f64::from(radius.meters()), zoom);
        self.circles.extend(
            dataset
                .features
                .iter()
                .filter(|feature| feature_visible(feature, &culling))
                .flat_map(|feature| feature.markers.iter())
                .map(|marker| BufferCircle {
                    center: marker.position,
                    radius_px,
                }),
        );
    }
}

/// Whether a feature's bounds touch `bounds`.
pub fn feature_visible(feature: &CityFeature, bounds: &geo::Rect<f64>) -> bool {
    feature
        .bounds
        .is_some_and(|feature_bounds| bounds.intersects(&feature_bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_dataset;

    const TWO_DISTRICTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Near" },
                "geometry": { "type": "Point", "coordinates": [26.1000, 44.4300] }
            },
            {
                "type": "Feature",
                "properties": { "name": "Far" },
                "geometry": { "type": "Point", "coordinates": [23.6000, 46.7700] }
            }
        ]
    }"#;

    fn around(lon: f64, lat: f64, half: f64) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::Coord { x: lon - half, y: lat - half },
            geo::Coord { x: lon + half, y: lat + half },
        )
    }

    #[test]
    fn rebuild_keeps_only_features_near_the_viewport() {
        let dataset = parse_dataset(TWO_DISTRICTS).unwrap();
        let mut layer = BufferLayer::default();
        layer.rebuild(&dataset, around(26.1, 44.43, 0.01), 0.2, 17, BufferRadius::default());
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.circles()[0].center, LatLng::new(44.43, 26.1));
    }

    #[test]
    fn padding_pulls_in_features_just_off_screen() {
        let dataset = parse_dataset(TWO_DISTRICTS).unwrap();
        let mut layer = BufferLayer::default();
        // Point sits 0.011 east of a viewport whose half-width is 0.01
        let viewport = around(26.089, 44.43, 0.01);
        layer.rebuild(&dataset, viewport, 0.0, 17, BufferRadius::default());
        assert!(layer.is_empty());
        layer.rebuild(&dataset, viewport, 0.2, 17, BufferRadius::default());
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn rebuild_applies_radius_for_zoom() {
        let dataset = parse_dataset(TWO_DISTRICTS).unwrap();
        let mut layer = BufferLayer::default();
        let radius = BufferRadius::from_meters(200).unwrap();
        layer.rebuild(&dataset, around(26.1, 44.43, 1.0), 0.2, 16, radius);
        assert_eq!(layer.circles()[0].radius_px, pixel_radius(200.0, 16));
    }

    #[test]
    fn rebuild_replaces_previous_content() {
        let dataset = parse_dataset(TWO_DISTRICTS).unwrap();
        let mut layer = BufferLayer::default();
        layer.rebuild(&dataset, around(25.0, 45.5, 5.0), 0.2, 10, BufferRadius::default());
        assert_eq!(layer.len(), 2);
        layer.rebuild(&Dataset::default(), around(25.0, 45.5, 5.0), 0.2, 10, BufferRadius::default());
        assert!(layer.is_empty());
    }
}
