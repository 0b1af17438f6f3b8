//! Core data types for the city buffer viewer.
//!
//! This module defines the geographic primitives, the loaded dataset and its
//! features, and the enumerated buffer radius the user picks from.

use crate::constants::{DEFAULT_RADIUS_M, RADIUS_OPTIONS_M};
use geo::HaversineDistance;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl LatLng {
    /// Creates a coordinate from latitude and longitude in degrees.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        geo::Point::from(*self).haversine_distance(&geo::Point::from(*other))
    }
}

impl From<LatLng> for geo::Point<f64> {
    fn from(value: LatLng) -> Self {
        geo::Point::new(value.lon, value.lat)
    }
}

impl From<LatLng> for geo::Coord<f64> {
    fn from(value: LatLng) -> Self {
        geo::Coord { x: value.lon, y: value.lat }
    }
}

impl From<geo::Coord<f64>> for LatLng {
    fn from(coord: geo::Coord<f64>) -> Self {
        LatLng::new(coord.y, coord.x)
    }
}

/// The GeoJSON geometry type of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// A single position
    Point,
    /// Several unconnected positions
    MultiPoint,
    /// An open line
    LineString,
    /// Several open lines
    MultiLineString,
    /// A ring-bounded area
    Polygon,
    /// Several ring-bounded areas
    MultiPolygon,
    /// A heterogeneous bag of geometries
    GeometryCollection,
}

impl GeometryKind {
    /// Classifies a parsed GeoJSON geometry value.
    pub fn of(value: &geojson::Value) -> Self {
        match value {
            geojson::Value::Point(_) => GeometryKind::Point,
            geojson::Value::MultiPoint(_) => GeometryKind::MultiPoint,
            geojson::Value::LineString(_) => GeometryKind::LineString,
            geojson::Value::MultiLineString(_) => GeometryKind::MultiLineString,
            geojson::Value::Polygon(_) => GeometryKind::Polygon,
            geojson::Value::MultiPolygon(_) => GeometryKind::MultiPolygon,
            geojson::Value::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// The GeoJSON `type` member for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        }
    }

    /// Whether features of this kind get buffer circles.
    pub fn is_buffered(&self) -> bool {
        matches!(
            self,
            GeometryKind::Point | GeometryKind::Polygon | GeometryKind::MultiPolygon
        )
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Real-world buffer radius, restricted to the selectable options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferRadius(u32);

impl BufferRadius {
    /// Every selectable radius, smallest first.
    pub const OPTIONS: [BufferRadius; RADIUS_OPTIONS_M.len()] = [
        BufferRadius(RADIUS_OPTIONS_M[0]),
        BufferRadius(RADIUS_OPTIONS_M[1]),
        BufferRadius(RADIUS_OPTIONS_M[2]),
        BufferRadius(RADIUS_OPTIONS_M[3]),
        BufferRadius(RADIUS_OPTIONS_M[4]),
    ];

    /// Returns the option matching `meters`, if it is one of the selectable values.
    #[cfg(test)]
    pub(crate) fn from_meters(meters: u32) -> Option<Self> {
        Self::OPTIONS.into_iter().find(|option| option.0 == meters)
    }

    /// Radius in meters.
    pub fn meters(&self) -> u32 {
        self.0
    }
}

impl Default for BufferRadius {
    fn default() -> Self {
        BufferRadius(DEFAULT_RADIUS_M)
    }
}

impl fmt::Display for BufferRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// A buffer circle anchored at one feature vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleMarker {
    /// Where the circle is centered
    pub position: LatLng,
}

impl CircleMarker {
    /// Creates a marker centered on `position`.
    pub fn new(position: LatLng) -> Self {
        Self { position }
    }
}

/// One named entity from a loaded dataset.
#[derive(Debug, Clone)]
pub struct CityFeature {
    /// Geometry type as declared in the source file
    pub kind: GeometryKind,
    /// Value of `properties.name`
    pub name: String,
    /// Geometry used for drawing and hit testing; `None` when the feature had none
    pub geometry: Option<geo::Geometry<f64>>,
    /// Bounding rectangle in lon/lat; `None` for empty geometries
    pub bounds: Option<geo::Rect<f64>>,
    /// Circle markers retained after deduplication
    pub markers: Vec<CircleMarker>,
}

impl CityFeature {
    /// Text shown in the feature's popup.
    pub fn popup_label(&self) -> String {
        crate::markers::popup_label(self.kind, &self.name)
    }
}

/// A parsed city dataset ready for rendering.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Features in file order
    pub features: Vec<CityFeature>,
    /// Union of all feature bounds; `None` when no feature has a geometry
    pub bounds: Option<geo::Rect<f64>>,
}

impl Dataset {
    /// Total number of retained circle markers across all features.
    pub fn marker_count(&self) -> usize {
        self.features.iter().map(|f| f.markers.len()).sum()
    }
}

/// A dataset the user can pick from the city dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSource {
    /// Display name in the dropdown
    pub label: String,
    /// URL or file path the GeoJSON is fetched from
    pub location: String,
}

impl DatasetSource {
    /// Creates a catalog entry.
    pub fn new(label: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            location: location.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_radius_defaults_to_fifty_meters() {
        assert_eq!(BufferRadius::default().meters(), 50);
        assert_eq!(BufferRadius::default().to_string(), "50m");
    }

    #[test]
    fn buffer_radius_rejects_values_outside_the_options() {
        assert!(BufferRadius::from_meters(75).is_none());
        assert_eq!(BufferRadius::from_meters(1000).map(|r| r.meters()), Some(1000));
    }

    #[test]
    fn only_points_and_areas_are_buffered() {
        let buffered: Vec<_> = [
            GeometryKind::Point,
            GeometryKind::MultiPoint,
            GeometryKind::LineString,
            GeometryKind::MultiLineString,
            GeometryKind::Polygon,
            GeometryKind::MultiPolygon,
            GeometryKind::GeometryCollection,
        ]
        .into_iter()
        .filter(GeometryKind::is_buffered)
        .collect();
        assert_eq!(
            buffered,
            vec![GeometryKind::Point, GeometryKind::Polygon, GeometryKind::MultiPolygon]
        );
    }

    #[test]
    fn distance_between_nearby_points_is_in_meters() {
        let a = LatLng::new(44.4268, 26.1025);
        let b = LatLng::new(44.4277, 26.1025);
        let d = a.distance_to(&b);
        // 0.0009 degrees of latitude is roughly 100 m
        assert!((d - 100.0).abs() < 1.0, "unexpected distance {d}");
    }
}
