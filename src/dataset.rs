//! Loading city datasets from GeoJSON.
//!
//! A dataset is a GeoJSON FeatureCollection. Each feature becomes a
//! [`CityFeature`] carrying its drawable geometry, its bounds and the buffer
//! circles retained for it.

use crate::markers::markers_for_geometry;
use crate::types::{CityFeature, Dataset, GeometryKind};
use geo::BoundingRect;
use thiserror::Error;

/// Why a dataset could not be loaded.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The request could not be completed
    #[error("failed to fetch {location}: {message}")]
    Fetch {
        /// URL or path that was requested
        location: String,
        /// Transport-level error description
        message: String,
    },
    /// The server answered with a non-success status
    #[error("{location} responded with HTTP {status}")]
    Status {
        /// URL that was requested
        location: String,
        /// HTTP status code
        status: u16,
    },
    /// A local file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The payload is not valid GeoJSON
    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    /// The payload is GeoJSON but not a FeatureCollection
    #[error("expected a FeatureCollection, found a {0}")]
    NotFeatureCollection(&'static str),
}

/// Parses GeoJSON text into a dataset.
pub fn parse_dataset(text: &str) -> Result<Dataset, DatasetError> {
    let collection = match text.parse::<geojson::GeoJson>()? {
        geojson::GeoJson::FeatureCollection(collection) => collection,
        geojson::GeoJson::Feature(_) => return Err(DatasetError::NotFeatureCollection("Feature")),
        geojson::GeoJson::Geometry(_) => {
            return Err(DatasetError::NotFeatureCollection("Geometry"))
        }
    };
    Ok(build_dataset(&collection))
}

/// Builds a dataset from an already parsed collection.
pub fn build_dataset(collection: &geojson::FeatureCollection) -> Dataset {
    let features: Vec<CityFeature> = collection
        .features
        .iter()
        .filter_map(build_feature)
        .collect();
    let bounds = union_bounds(features.iter().filter_map(|f| f.bounds));
    log::info!(
        "loaded {} features with {} buffer circles",
        features.len(),
        features.iter().map(|f| f.markers.len()).sum::<usize>()
    );
    Dataset { features, bounds }
}

/// Converts one GeoJSON feature.
///
/// Features without a geometry have no geometry type to label them with and are
/// skipped with a warning.
pub fn build_feature(feature: &geojson::Feature) -> Option<CityFeature> {
    let Some(source) = feature.geometry.as_ref() else {
        log::warn!("skipping feature {:?} without geometry", feature_name(feature));
        return None;
    };
    let kind = GeometryKind::of(&source.value);
    let name = feature_name(feature);
    let markers = markers_for_geometry(Some(source));

    let geometry = match geo::Geometry::<f64>::try_from(source.value.clone()) {
        Ok(geometry) => Some(geometry),
        Err(err) => {
            log::warn!("cannot draw {kind} feature {name:?}: {err}");
            None
        }
    };
    let bounds = geometry.as_ref().and_then(|g| g.bounding_rect());

    Some(CityFeature {
        kind,
        name,
        geometry,
        bounds,
        markers,
    })
}

/// `properties.name` as display text; non-string names are shown as JSON.
fn feature_name(feature: &geojson::Feature) -> String {
    match feature.property("name") {
        Some(serde_json::Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn union_bounds(rects: impl Iterator<Item = geo::Rect<f64>>) -> Option<geo::Rect<f64>> {
    rects.reduce(|acc, rect| {
        geo::Rect::new(
            geo::Coord {
                x: acc.min().x.min(rect.min().x),
                y: acc.min().y.min(rect.min().y),
            },
            geo::Coord {
                x: acc.max().x.max(rect.max().x),
                y: acc.max().y.max(rect.max().y),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "City Hall" },
                "geometry": { "type": "Point", "coordinates": [26.0979, 44.4320] }
            },
            {
                "type": "Feature",
                "properties": { "name": "Kiosk" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [26.10000, 44.43000],
                        [26.10003, 44.43000],
                        [26.10003, 44.43002],
                        [26.10000, 44.43000]
                    ]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Calea Victoriei" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[26.0960, 44.4400], [26.0990, 44.4300]]
                }
            }
        ]
    }"#;

    #[test]
    fn parses_feature_collection() {
        let dataset = parse_dataset(SAMPLE).expect("sample should parse");
        assert_eq!(dataset.features.len(), 3);
        assert_eq!(dataset.features[0].popup_label(), "[Point] City Hall");
        assert_eq!(dataset.features[2].kind, GeometryKind::LineString);
    }

    #[test]
    fn tiny_polygon_renders_one_marker() {
        let dataset = parse_dataset(SAMPLE).unwrap();
        assert_eq!(dataset.features[1].markers.len(), 1);
    }

    #[test]
    fn unsupported_geometry_is_kept_without_markers() {
        let dataset = parse_dataset(SAMPLE).unwrap();
        let line = &dataset.features[2];
        assert!(line.markers.is_empty());
        assert!(line.geometry.is_some());
        assert_eq!(dataset.marker_count(), 2);
    }

    #[test]
    fn dataset_bounds_cover_all_features() {
        let bounds = parse_dataset(SAMPLE).unwrap().bounds.expect("bounds");
        assert!(bounds.min().x <= 26.0960 && bounds.max().x >= 26.10003);
        assert!(bounds.min().y <= 44.4300 && bounds.max().y >= 44.4400);
    }

    #[test]
    fn missing_name_becomes_empty_label() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1.0,2.0]}}
        ]}"#;
        let dataset = parse_dataset(text).unwrap();
        assert_eq!(dataset.features[0].popup_label(), "[Point] ");
    }

    #[test]
    fn features_without_geometry_are_skipped() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"ghost"},"geometry":null}
        ]}"#;
        let dataset = parse_dataset(text).unwrap();
        assert!(dataset.features.is_empty());
        assert!(dataset.bounds.is_none());
    }

    #[test]
    fn rejects_bare_geometry() {
        let err = parse_dataset(r#"{"type":"Point","coordinates":[1.0,2.0]}"#).unwrap_err();
        assert!(matches!(err, DatasetError::NotFeatureCollection("Geometry")));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_dataset("{ not json").unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
        assert!(err.to_string().starts_with("invalid GeoJSON"));
    }
}
