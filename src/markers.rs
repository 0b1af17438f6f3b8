//! Buffer circle placement for individual features.
//!
//! Every buffered feature contributes one candidate position per vertex. Candidates
//! that crowd each other are pruned so that the circles retained for a feature are
//! pairwise at least [`MIN_MARKER_SEPARATION_M`] apart.

use crate::constants::MIN_MARKER_SEPARATION_M;
use crate::types::{CircleMarker, GeometryKind, LatLng};

/// Converts a GeoJSON position (`[lon, lat, ...]`) into a coordinate.
///
/// Positions with fewer than two elements are malformed and yield `None`.
fn position_to_latlng(position: &[f64]) -> Option<LatLng> {
    match position {
        [lon, lat, ..] => Some(LatLng::new(*lat, *lon)),
        _ => None,
    }
}

fn ring_positions<'a>(rings: &'a [Vec<Vec<f64>>]) -> impl Iterator<Item = LatLng> + 'a {
    rings
        .iter()
        .flat_map(|ring| ring.iter().filter_map(|p| position_to_latlng(p)))
}

/// Lists the candidate circle positions for one geometry, in file order.
///
/// Points yield their position. Polygons and multipolygons yield every vertex of
/// every ring, closing vertices included. Other geometry types are not buffered:
/// they yield nothing and a warning is logged.
pub fn candidate_positions(value: &geojson::Value) -> Vec<LatLng> {
    let kind = GeometryKind::of(value);
    if !kind.is_buffered() {
        log::warn!("unsupported geometry type {kind}");
        return Vec::new();
    }
    match value {
        geojson::Value::Point(position) => position_to_latlng(position).into_iter().collect(),
        geojson::Value::Polygon(rings) => ring_positions(rings).collect(),
        geojson::Value::MultiPolygon(polygons) => {
            log::debug!("flattening {} polygons of a MultiPolygon", polygons.len());
            polygons
                .iter()
                .flat_map(|rings| ring_positions(rings))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Prunes crowded candidates, keeping the result order.
///
/// A candidate is dropped when any candidate *after* it lies closer than
/// `min_distance_m`. The last member of a crowded cluster therefore survives, and
/// the outcome depends on input order.
pub fn dedup_markers(candidates: &[LatLng], min_distance_m: f64) -> Vec<CircleMarker> {
    candidates
        .iter()
        .enumerate()
        .filter(|(i, current)| {
            !candidates[i + 1..]
                .iter()
                .any(|later| current.distance_to(later) < min_distance_m)
        })
        .map(|(_, position)| CircleMarker::new(*position))
        .collect()
}

/// Builds the retained circle markers for a feature geometry.
pub fn markers_for_geometry(geometry: Option<&geojson::Geometry>) -> Vec<CircleMarker> {
    match geometry {
        Some(geometry) => {
            dedup_markers(&candidate_positions(&geometry.value), MIN_MARKER_SEPARATION_M)
        }
        None => {
            log::warn!("feature without geometry gets no buffer circles");
            Vec::new()
        }
    }
}

/// Popup text for a feature: `[<geometry-type>] <name>`.
pub fn popup_label(kind: GeometryKind, name: &str) -> String {
    format!("[{kind}] {name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Offsets a coordinate by roughly `north_m` / `east_m` meters.
    fn offset(origin: LatLng, north_m: f64, east_m: f64) -> LatLng {
        let lat = origin.lat + north_m / 111_195.0;
        let lon = origin.lon + east_m / (111_195.0 * origin.lat.to_radians().cos());
        LatLng::new(lat, lon)
    }

    const ORIGIN: LatLng = LatLng::new(44.4268, 26.1025);

    #[test]
    fn point_yields_single_candidate() {
        let value = geojson::Value::Point(vec![26.1, 44.4]);
        assert_eq!(candidate_positions(&value), vec![LatLng::new(44.4, 26.1)]);
    }

    #[test]
    fn polygon_flattens_all_rings_in_order() {
        let outer = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ];
        let hole = vec![vec![0.2, 0.2], vec![0.3, 0.2], vec![0.2, 0.2]];
        let value = geojson::Value::Polygon(vec![outer, hole]);
        let candidates = candidate_positions(&value);
        assert_eq!(candidates.len(), 7);
        assert_eq!(candidates[4], LatLng::new(0.2, 0.2));
    }

    #[test]
    fn multipolygon_flattens_every_polygon() {
        let square = |x: f64| {
            vec![vec![
                vec![x, 0.0],
                vec![x + 1.0, 0.0],
                vec![x + 1.0, 1.0],
                vec![x, 0.0],
            ]]
        };
        let value = geojson::Value::MultiPolygon(vec![square(0.0), square(5.0)]);
        assert_eq!(candidate_positions(&value).len(), 8);
    }

    #[test]
    fn unsupported_geometries_yield_nothing() {
        let line = geojson::Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
        let multi = geojson::Value::MultiPoint(vec![vec![0.0, 0.0]]);
        assert!(candidate_positions(&line).is_empty());
        assert!(candidate_positions(&multi).is_empty());
    }

    #[test]
    fn malformed_positions_are_skipped() {
        let value = geojson::Value::Polygon(vec![vec![vec![1.0], vec![2.0, 3.0]]]);
        assert_eq!(candidate_positions(&value), vec![LatLng::new(3.0, 2.0)]);
    }

    #[test]
    fn crowded_vertices_collapse_to_one_marker() {
        let ring = vec![
            ORIGIN,
            offset(ORIGIN, 0.0, 3.0),
            offset(ORIGIN, 3.0, 3.0),
            ORIGIN,
        ];
        let markers = dedup_markers(&ring, MIN_MARKER_SEPARATION_M);
        assert_eq!(markers.len(), 1);
        // The last member of the cluster is the one that survives
        assert_eq!(markers[0].position, ORIGIN);
    }

    #[test]
    fn later_candidate_wins_a_conflict() {
        let a = ORIGIN;
        let b = offset(ORIGIN, 10.0, 0.0);
        let markers = dedup_markers(&[a, b], MIN_MARKER_SEPARATION_M);
        assert_eq!(markers, vec![CircleMarker::new(b)]);
    }

    #[test]
    fn retained_markers_respect_minimum_separation() {
        // A jittered walk where many steps fall under the threshold
        let mut candidates = Vec::new();
        let mut north = 0.0;
        for i in 0..60 {
            north += [4.0, 25.0, 9.0, 31.0, 15.0][i % 5];
            candidates.push(offset(ORIGIN, north, (i % 3) as f64 * 6.0));
        }
        let markers = dedup_markers(&candidates, MIN_MARKER_SEPARATION_M);
        assert!(markers.len() <= candidates.len());
        assert!(!markers.is_empty());
        for (i, a) in markers.iter().enumerate() {
            for b in &markers[i + 1..] {
                let d = a.position.distance_to(&b.position);
                assert!(d >= MIN_MARKER_SEPARATION_M - 1e-9, "markers only {d} m apart");
            }
        }
    }

    #[test]
    fn well_separated_candidates_are_all_kept() {
        let candidates: Vec<LatLng> = (0..5)
            .map(|i| offset(ORIGIN, i as f64 * 50.0, 0.0))
            .collect();
        assert_eq!(dedup_markers(&candidates, MIN_MARKER_SEPARATION_M).len(), 5);
    }

    #[test]
    fn missing_geometry_yields_no_markers() {
        assert!(markers_for_geometry(None).is_empty());
    }

    #[test]
    fn popup_label_includes_geometry_type_and_name() {
        assert_eq!(popup_label(GeometryKind::Point, "City Hall"), "[Point] City Hall");
        assert_eq!(
            popup_label(GeometryKind::MultiPolygon, "Old Town"),
            "[MultiPolygon] Old Town"
        );
    }
}
