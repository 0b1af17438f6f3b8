//! Viewer state and its update rules.
//!
//! [`reduce`] is a pure function: it takes the current [`ViewerState`] and an
//! [`Action`] and returns the next state together with the [`Command`]s the UI has
//! to carry out (fetching, clearing, redrawing). Rendering is a projection of the
//! state plus the dataset the UI holds.
//!
//! Every dataset request and every file picker is tagged with a token from one
//! counter. Only the latest dataset request and the open picker are listened to,
//! so a slow response for a city the user already switched away from can never
//! overwrite the newer one. Opening the picker leaves a pending city load alone;
//! only a file that was actually chosen supersedes it.

use crate::types::{BufferRadius, DatasetSource};

/// Progress of the most recent dataset request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The latest request succeeded
    Ready,
    /// The latest request failed with the given message
    Failed(String),
}

/// Explicit application state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewerState {
    /// Buffer distance applied to every circle
    pub radius: BufferRadius,
    /// Catalog index shown in the city dropdown; `None` for a file opened from disk
    pub selected_dataset: Option<usize>,
    /// Label of the dataset being shown or loaded
    pub active_label: Option<String>,
    /// Token of the dataset request whose result will be installed
    pub generation: u64,
    /// Token of the file picker currently open, if any
    pub picker: Option<u64>,
    /// Last token handed out to a request or picker
    pub last_token: u64,
    /// Status of the dataset request
    pub status: LoadStatus,
}

impl ViewerState {
    fn issue_token(&mut self) -> u64 {
        self.last_token += 1;
        self.last_token
    }

    /// Whether a completion tagged `token` is still awaited.
    pub fn awaits(&self, token: u64) -> bool {
        token == self.generation || self.picker == Some(token)
    }
}

/// Something that happened: a user choice, a finished request or a view change.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A buffer radius option was clicked
    SelectRadius(BufferRadius),
    /// A city was chosen from the catalog
    SelectDataset {
        /// Index in the catalog
        index: usize,
        /// The chosen catalog entry
        source: DatasetSource,
    },
    /// The user asked to open a GeoJSON file from disk
    OpenLocalFile,
    /// A request finished successfully
    LoadFinished {
        /// Generation the request was started with
        generation: u64,
        /// Display label of the loaded dataset
        label: String,
        /// Catalog index the request came from, if any
        catalog_index: Option<usize>,
    },
    /// A request failed
    LoadFailed {
        /// Generation the request was started with
        generation: u64,
        /// Human-readable reason
        message: String,
    },
    /// The user dismissed the file picker
    LoadCancelled {
        /// Generation the picker was opened with
        generation: u64,
    },
    /// The map was panned or zoomed
    ViewChanged,
}

/// Side effects requested by [`reduce`], executed by the UI in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drop the installed dataset, its buffer circles and any open popup
    ClearDataset,
    /// Start fetching `location`
    Fetch {
        /// Generation to tag the result with
        generation: u64,
        /// URL or path to fetch
        location: String,
        /// Label to show once loaded
        label: String,
        /// Catalog index of the request
        catalog_index: Option<usize>,
    },
    /// Show a file picker and load the chosen file
    PickFile {
        /// Generation to tag the result with
        generation: u64,
    },
    /// Install the dataset that just arrived
    InstallDataset,
    /// Fit the view to the installed dataset
    FitBounds,
    /// Rebuild the buffer layer for the current view and radius
    Redraw,
}

/// Computes the next state for `action`.
pub fn reduce(state: &ViewerState, action: Action) -> (ViewerState, Vec<Command>) {
    let mut next = state.clone();
    let commands = match action {
        Action::SelectRadius(radius) => {
            next.radius = radius;
            vec![Command::Redraw]
        }
        Action::SelectDataset { index, source } => {
            next.generation = next.issue_token();
            next.selected_dataset = Some(index);
            next.active_label = Some(source.label.clone());
            next.status = LoadStatus::Loading;
            vec![
                Command::ClearDataset,
                Command::Fetch {
                    generation: next.generation,
                    location: source.location,
                    label: source.label,
                    catalog_index: Some(index),
                },
            ]
        }
        Action::OpenLocalFile => {
            let token = next.issue_token();
            next.picker = Some(token);
            vec![Command::PickFile { generation: token }]
        }
        Action::LoadFinished { generation, .. }
        | Action::LoadFailed { generation, .. }
        | Action::LoadCancelled { generation }
            if !state.awaits(generation) =>
        {
            log::debug!(
                "ignoring stale dataset response (token {generation}, current {})",
                state.generation
            );
            Vec::new()
        }
        Action::LoadFinished {
            generation,
            label,
            catalog_index,
        } => {
            // A chosen file replaces whatever city was still loading
            if state.picker == Some(generation) {
                next.picker = None;
            }
            next.generation = generation;
            next.status = LoadStatus::Ready;
            next.active_label = Some(label);
            next.selected_dataset = catalog_index;
            vec![
                Command::ClearDataset,
                Command::InstallDataset,
                Command::FitBounds,
                Command::Redraw,
            ]
        }
        Action::LoadFailed {
            generation,
            message,
        } => {
            if state.picker == Some(generation) {
                next.picker = None;
            }
            next.status = LoadStatus::Failed(message);
            Vec::new()
        }
        Action::LoadCancelled { .. } => {
            next.picker = None;
            Vec::new()
        }
        Action::ViewChanged => vec![Command::Redraw],
    };
    (next, commands)
}

/// Active flag for every radius option, in display order.
pub fn radius_option_states(state: &ViewerState) -> Vec<(BufferRadius, bool)> {
    BufferRadius::OPTIONS
        .into_iter()
        .map(|option| (option, option == state.radius))
        .collect()
}
