//! Zoom-adaptive sizing of buffer circles.

use crate::constants::REFERENCE_ZOOM;

/// On-screen radius in pixels for a buffer of `meters` at integer `zoom`.
///
/// At [`REFERENCE_ZOOM`] one meter spans two pixels; every zoom level out halves
/// the radius.
pub fn pixel_radius(meters: f64, zoom: u8) -> f32 {
    let levels_out = i32::from(REFERENCE_ZOOM) - i32::from(zoom);
    (2.0 * meters / 2f64.powi(levels_out)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_ZOOM, MIN_ZOOM, RADIUS_OPTIONS_M};
    use approx::assert_relative_eq;

    #[test]
    fn reference_zoom_doubles_meters() {
        assert_relative_eq!(pixel_radius(50.0, 18), 100.0);
        assert_relative_eq!(pixel_radius(50.0, 17), 50.0);
        assert_relative_eq!(pixel_radius(1000.0, 10), 7.8125);
    }

    #[test]
    fn increases_with_zoom_for_fixed_meters() {
        for meters in RADIUS_OPTIONS_M {
            for zoom in MIN_ZOOM..MAX_ZOOM {
                assert!(pixel_radius(meters as f64, zoom) < pixel_radius(meters as f64, zoom + 1));
            }
        }
    }

    #[test]
    fn increases_with_meters_for_fixed_zoom() {
        for zoom in MIN_ZOOM..=MAX_ZOOM {
            for pair in RADIUS_OPTIONS_M.windows(2) {
                assert!(pixel_radius(pair[0] as f64, zoom) < pixel_radius(pair[1] as f64, zoom));
            }
        }
    }
}
