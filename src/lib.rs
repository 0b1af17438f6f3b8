//! # City Buffers
//!
//! An interactive map of city buildings with adjustable buffer circles. A GeoJSON
//! dataset is loaded per city; every feature gets circle markers at its vertices
//! (kept at least 20 m apart), drawn with a selectable buffer radius that scales
//! with the zoom level.
//!
//! ## Features
//! - City selector that reloads the dataset and fits the view to it
//! - Buffer radius options of 50, 100, 200, 500 and 1000 meters
//! - Panning and integer-level zooming, with circles rebuilt for the visible area
//! - Feature popups labelled with the geometry type and name
//! - Opening local GeoJSON files

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod dataset;
pub mod fetch;
pub mod layer;
pub mod markers;
pub mod projection;
pub mod radius;
pub mod state;
pub mod types;
mod ui;

// Re-export public types and functions
pub use config::AppConfig;
pub use dataset::{parse_dataset, DatasetError};
pub use types::*;
pub use ui::{
    CityBuffersApp, DatasetFetcher, FetchRequest, LoadOutcome, LoaderMessage, Popup, UiPreferences,
};

/// Runs the city buffer map with the configuration from the environment.
///
/// This function starts a tokio runtime for dataset requests, opens the egui
/// window and runs the main event loop.
///
/// # Returns
///
/// Returns `Ok(())` when the window is closed, or an error if the runtime or the
/// window could not be created.
///
/// # Example
///
/// ```no_run
/// use city_buffers::run_app;
///
/// fn main() -> anyhow::Result<()> {
///     run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> anyhow::Result<()> {
    use anyhow::Context as _;

    let runtime = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
    let _guard = runtime.enter();

    let config = AppConfig::load();
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "City Buffers",
        options,
        Box::new(move |cc| Ok(Box::new(CityBuffersApp::new(cc, config)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the map window: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_radius() {
        assert_eq!(BufferRadius::default().meters(), 50);
        assert_eq!(BufferRadius::OPTIONS.len(), 5);
    }

    #[test]
    fn test_default_app_state() {
        let app = CityBuffersApp::default();
        assert!(app.dataset.is_none());
        assert!(app.buffer_layer.is_empty());
        assert!(!app.started);
        assert_eq!(app.config.datasets.len(), 2);
    }
}
