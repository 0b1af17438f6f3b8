//! Shared application-wide constants.
//! Centralizes tweakable values used across marker building, projection and rendering.

use eframe::egui::Color32;

// Markers
/// Minimum geodesic separation (meters) between two retained circle markers of one feature.
pub const MIN_MARKER_SEPARATION_M: f64 = 20.0;
/// Selectable buffer radii in meters, in display order.
pub const RADIUS_OPTIONS_M: [u32; 5] = [50, 100, 200, 500, 1000];
/// Buffer radius active on startup.
pub const DEFAULT_RADIUS_M: u32 = 50;

// Zoom
/// Zoom level at which one meter of buffer radius maps to two screen pixels.
pub const REFERENCE_ZOOM: u8 = 18;
/// Most zoomed-in level the map allows.
pub const MAX_ZOOM: u8 = 18;
/// Most zoomed-out level the map allows.
pub const MIN_ZOOM: u8 = 3;
/// Initial zoom before any dataset is fit into view.
pub const DEFAULT_ZOOM: u8 = 17;
/// Initial map center as (latitude, longitude).
pub const DEFAULT_CENTER: (f64, f64) = (44.429283, 26.103541);

// Projection
/// Edge length of one Web Mercator tile in pixels.
pub const TILE_SIZE: f64 = 256.0;
/// Fraction of the viewport added on each side when culling features for redraw.
pub const VIEWPORT_PADDING: f64 = 0.2;

// Canvas interactions
/// Accumulated wheel travel (in points) that triggers one zoom step.
pub const SCROLL_ZOOM_STEP: f32 = 50.0;
/// Pick radius around Point features, in screen pixels.
pub const POINT_HIT_RADIUS: f32 = 8.0;

// Buffer circle styling
/// Buffer circle fill color before opacity is applied.
pub const BUFFER_FILL: Color32 = Color32::from_rgb(0xff, 0x78, 0x00);
/// Opacity applied to the buffer fill.
pub const BUFFER_FILL_OPACITY: f32 = 0.2;
/// Buffer circle outline color before opacity is applied.
pub const BUFFER_STROKE: Color32 = Color32::BLACK;
/// Opacity applied to the buffer outline.
pub const BUFFER_STROKE_OPACITY: f32 = 0.2;
/// Buffer outline width in screen pixels.
pub const BUFFER_STROKE_WIDTH: f32 = 0.5;

// Feature styling
/// Outline color for polygon features and fill for point features.
pub const FEATURE_COLOR: Color32 = Color32::from_rgb(0x33, 0x88, 0xff);
/// Polygon outline width in screen pixels.
pub const FEATURE_STROKE_WIDTH: f32 = 2.0;
/// Radius of the dot drawn for Point features, in screen pixels.
pub const POINT_DOT_RADIUS: f32 = 4.0;
