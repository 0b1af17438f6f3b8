//! Application state management structures.
//!
//! This module contains the main application struct and the state it keeps next
//! to the pure [`ViewerState`]: the installed dataset, the buffer layer, canvas
//! navigation, the open popup and the dataset loader channel.

use super::loader::{AsyncFetcher, DatasetFetcher, LoaderMessage};
use crate::config::AppConfig;
use crate::layer::BufferLayer;
use crate::projection::MapView;
use crate::state::ViewerState;
use crate::types::{Dataset, LatLng};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Storage key for persisted UI preferences.
pub const PREFERENCES_KEY: &str = "ui_preferences";

/// State related to canvas navigation.
///
/// Tracks the screen rectangle the map was last drawn into and the pointer
/// gesture in progress.
pub struct CanvasState {
    /// Screen rectangle of the map canvas from the last frame
    pub viewport: egui::Rect,
    /// Pointer position seen in the previous frame of a gesture
    pub last_pointer_pos: Option<egui::Pos2>,
    /// Whether the current gesture has moved the map
    pub is_panning: bool,
    /// Wheel travel not yet turned into a zoom step
    pub scroll_accumulator: f32,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            viewport: egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1200.0, 800.0)),
            last_pointer_pos: None,
            is_panning: false,
            scroll_accumulator: 0.0,
        }
    }
}

/// An open feature popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    /// Coordinate the popup points at
    pub anchor: LatLng,
    /// Text shown, e.g. `[Polygon] National Theatre`
    pub label: String,
}

/// Dataset loading plumbing.
///
/// Async fetches report back over the channel; the UI drains it once per frame.
pub struct LoaderState {
    /// Cloned into every fetch task
    pub sender: Sender<LoaderMessage>,
    /// Drained by the UI thread
    pub receiver: Receiver<LoaderMessage>,
    /// Starts fetches and file pickers
    pub fetcher: Box<dyn DatasetFetcher>,
    /// Dataset received this frame, waiting for the reducer to accept it
    pub staged: Option<Dataset>,
}

impl Default for LoaderState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            fetcher: Box::new(AsyncFetcher),
            staged: None,
        }
    }
}

/// UI settings remembered between sessions.
///
/// The selected buffer radius is not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

impl UiPreferences {
    /// Serializes the preferences to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes preferences from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The main application structure.
///
/// This struct implements the `eframe::App` trait and owns everything the map
/// needs between frames.
pub struct CityBuffersApp {
    /// Dataset catalog and initial view
    pub config: AppConfig,
    /// Selected radius, active dataset and request generation
    pub viewer: ViewerState,
    /// Current map center and zoom
    pub view: MapView,
    /// Installed dataset, if any
    pub dataset: Option<Dataset>,
    /// Circles produced by the last redraw
    pub buffer_layer: BufferLayer,
    /// Canvas navigation state
    pub canvas: CanvasState,
    /// Feature popup currently shown
    pub popup: Option<Popup>,
    /// Dataset loader channel and fetcher
    pub loader: LoaderState,
    /// Persisted UI preferences
    pub preferences: UiPreferences,
    /// Whether the initial dataset request has been issued
    pub started: bool,
}

impl Default for CityBuffersApp {
    fn default() -> Self {
        Self::with_config(AppConfig::default())
    }
}

impl CityBuffersApp {
    /// Creates an app for `config` with default preferences.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            view: config.initial_view(),
            config,
            viewer: ViewerState::default(),
            dataset: None,
            buffer_layer: BufferLayer::default(),
            canvas: CanvasState::default(),
            popup: None,
            loader: LoaderState::default(),
            preferences: UiPreferences::default(),
            started: false,
        }
    }

    /// Creates the app at startup, restoring preferences from eframe storage.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let preferences = cc
            .storage
            .and_then(|storage| storage.get_string(PREFERENCES_KEY))
            .and_then(|json| match UiPreferences::from_json(&json) {
                Ok(preferences) => Some(preferences),
                Err(err) => {
                    log::warn!("ignoring stored preferences: {err}");
                    None
                }
            })
            .unwrap_or_default();
        Self {
            preferences,
            ..Self::with_config(config)
        }
    }

    /// Replaces the fetcher used for dataset requests.
    pub fn with_fetcher(mut self, fetcher: Box<dyn DatasetFetcher>) -> Self {
        self.loader.fetcher = fetcher;
        self
    }
}
