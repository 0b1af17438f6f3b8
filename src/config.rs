//! Startup configuration: the dataset catalog and the initial view.
//!
//! Defaults are built in. Setting `CITY_BUFFERS_CONFIG` to the path of a JSON file
//! replaces them:
//!
//! ```json
//! {
//!   "datasets": [{ "label": "Bucharest", "location": "data/bucharest.geojson" }],
//!   "center": [44.429283, 26.103541],
//!   "zoom": 17
//! }
//! ```

use crate::constants::{DEFAULT_CENTER, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::projection::MapView;
use crate::types::{DatasetSource, LatLng};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV_VAR: &str = "CITY_BUFFERS_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Datasets offered in the city dropdown; the first one loads on startup
    pub datasets: Vec<DatasetSource>,
    /// Initial map center as `[lat, lon]`
    pub center: [f64; 2],
    /// Initial zoom level
    pub zoom: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            datasets: vec![
                DatasetSource::new("Bucharest", "data/bucharest.geojson"),
                DatasetSource::new("Cluj-Napoca", "data/cluj-napoca.geojson"),
            ],
            center: [DEFAULT_CENTER.0, DEFAULT_CENTER.1],
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl AppConfig {
    /// Loads the configuration named by [`CONFIG_ENV_VAR`], falling back to the
    /// defaults when it is unset or unusable.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        match Self::from_path(Path::new(&path)) {
            Ok(config) => {
                log::info!("using configuration from {}", Path::new(&path).display());
                config
            }
            Err(err) => {
                log::error!("{err:#}; falling back to built-in datasets");
                Self::default()
            }
        }
    }

    /// Reads and validates a configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses and validates configuration JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            bail!("at least one dataset is required");
        }
        if let Some(entry) = self.datasets.iter().find(|d| d.location.trim().is_empty()) {
            bail!("dataset {:?} has an empty location", entry.label);
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.zoom) {
            bail!("zoom {} is outside {MIN_ZOOM}..={MAX_ZOOM}", self.zoom);
        }
        let [lat, lon] = self.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            bail!("center [{lat}, {lon}] is not a valid coordinate");
        }
        Ok(())
    }

    /// The view shown before the first dataset arrives.
    pub fn initial_view(&self) -> MapView {
        MapView::new(LatLng::new(self.center[0], self.center[1]), self.zoom)
    }
}
