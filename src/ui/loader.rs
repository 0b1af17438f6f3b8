//! Dataset loading for both native and WASM.
//!
//! Requests run as async tasks (tokio on native, `spawn_local` in the browser) and
//! send their outcome back to the UI thread over a channel, tagged with the
//! generation they were started with.

use super::state::CityBuffersApp;
use crate::fetch;
use crate::state::Action;
use crate::types::Dataset;
use eframe::egui;
use std::future::Future;
use std::sync::mpsc::Sender;

/// A request to fetch one catalog dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Generation to report back with
    pub generation: u64,
    /// URL or path to fetch
    pub location: String,
    /// Label shown once loaded
    pub label: String,
    /// Catalog index the request came from
    pub catalog_index: Option<usize>,
}

/// How a request ended.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The dataset was fetched and parsed
    Loaded {
        /// Label to show for the dataset
        label: String,
        /// Catalog index the request came from
        catalog_index: Option<usize>,
        /// The parsed dataset
        dataset: Dataset,
    },
    /// Fetching or parsing failed
    Failed(String),
    /// The user dismissed the file picker
    Cancelled,
}

/// Messages sent from async loads back to the main app.
#[derive(Debug)]
pub struct LoaderMessage {
    /// Generation of the request that produced this message
    pub generation: u64,
    /// What happened
    pub outcome: LoadOutcome,
}

/// Starts dataset requests on behalf of the UI.
pub trait DatasetFetcher {
    /// Fetches a catalog dataset and reports on `reply`.
    fn fetch(&self, request: FetchRequest, reply: Sender<LoaderMessage>, ctx: &egui::Context);

    /// Lets the user pick a local GeoJSON file and reports on `reply`.
    fn pick_file(&self, generation: u64, reply: Sender<LoaderMessage>, ctx: &egui::Context);
}

/// The real fetcher: async HTTP/file reads and platform file pickers.
pub struct AsyncFetcher;

impl DatasetFetcher for AsyncFetcher {
    fn fetch(&self, request: FetchRequest, reply: Sender<LoaderMessage>, ctx: &egui::Context) {
        let ctx = ctx.clone();
        spawn_task(async move {
            let outcome = match fetch::load_dataset(&request.location).await {
                Ok(dataset) => LoadOutcome::Loaded {
                    label: request.label,
                    catalog_index: request.catalog_index,
                    dataset,
                },
                Err(err) => {
                    log::error!("failed to load {}: {err}", request.location);
                    LoadOutcome::Failed(err.to_string())
                }
            };
            let _ = reply.send(LoaderMessage {
                generation: request.generation,
                outcome,
            });
            ctx.request_repaint();
        });
    }

    fn pick_file(&self, generation: u64, reply: Sender<LoaderMessage>, ctx: &egui::Context) {
        let ctx = ctx.clone();

        #[cfg(not(target_arch = "wasm32"))]
        spawn_task(async move {
            let outcome = match rfd::AsyncFileDialog::new()
                .add_filter("GeoJSON", &["geojson", "json"])
                .pick_file()
                .await
            {
                Some(handle) => {
                    let path = handle.path().display().to_string();
                    match fetch::load_dataset(&path).await {
                        Ok(dataset) => LoadOutcome::Loaded {
                            label: handle.file_name(),
                            catalog_index: None,
                            dataset,
                        },
                        Err(err) => {
                            log::error!("failed to open {path}: {err}");
                            LoadOutcome::Failed(err.to_string())
                        }
                    }
                }
                None => LoadOutcome::Cancelled,
            };
            let _ = reply.send(LoaderMessage { generation, outcome });
            ctx.request_repaint();
        });

        #[cfg(target_arch = "wasm32")]
        spawn_task(async move {
            let outcome = match browser::pick_geojson_file().await {
                Some(file) => {
                    let label = file.name();
                    match browser::read_text(file).await {
                        Ok(content) => match crate::dataset::parse_dataset(&content) {
                            Ok(dataset) => LoadOutcome::Loaded {
                                label,
                                catalog_index: None,
                                dataset,
                            },
                            Err(err) => LoadOutcome::Failed(err.to_string()),
                        },
                        Err(err) => LoadOutcome::Failed(err),
                    }
                }
                None => LoadOutcome::Cancelled,
            };
            let _ = reply.send(LoaderMessage { generation, outcome });
            ctx.request_repaint();
        });
    }
}

/// Runs `task` on the ambient tokio runtime, or on a private one when the app was
/// started without one.
#[cfg(not(target_arch = "wasm32"))]
fn spawn_task(task: impl Future<Output = ()> + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => {
            std::thread::spawn(move || {
                match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime.block_on(task),
                    Err(err) => log::error!("failed to start a loader runtime: {err}"),
                }
            });
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn_task(task: impl Future<Output = ()> + 'static) {
    wasm_bindgen_futures::spawn_local(task);
}

impl CityBuffersApp {
    /// Applies every loader message that arrived since the last frame.
    pub fn handle_loader_messages(&mut self, ctx: &egui::Context) {
        let messages: Vec<LoaderMessage> = self.loader.receiver.try_iter().collect();
        for message in messages {
            self.apply_loader_message(message, ctx);
        }
    }

    /// Turns one loader message into an [`Action`] and dispatches it.
    ///
    /// A received dataset is staged first; it is only installed if the reducer
    /// accepts the generation.
    pub fn apply_loader_message(&mut self, message: LoaderMessage, ctx: &egui::Context) {
        let LoaderMessage { generation, outcome } = message;
        let action = match outcome {
            LoadOutcome::Loaded {
                label,
                catalog_index,
                dataset,
            } => {
                self.loader.staged = Some(dataset);
                Action::LoadFinished {
                    generation,
                    label,
                    catalog_index,
                }
            }
            LoadOutcome::Failed(message) => Action::LoadFailed {
                generation,
                message,
            },
            LoadOutcome::Cancelled => Action::LoadCancelled { generation },
        };
        self.dispatch(action, ctx);
        if self.loader.staged.take().is_some() {
            log::debug!("dropped dataset from superseded request {generation}");
        }
    }
}

/// GeoJSON file selection in the browser.
#[cfg(target_arch = "wasm32")]
mod browser {
    use futures::channel::oneshot;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};

    const ACCEPTED_TYPES: &str = ".geojson,.json,application/geo+json,application/json";

    /// Asks the user for a GeoJSON file via a detached `<input type=file>`.
    ///
    /// `None` when the picker is dismissed, or when the input cannot be built.
    pub async fn pick_geojson_file() -> Option<web_sys::File> {
        let document = web_sys::window()?.document()?;
        let body = document.body()?;
        let input: web_sys::HtmlInputElement = document.create_element("input").ok()?.dyn_into().ok()?;
        input.set_type("file");
        input.set_accept(ACCEPTED_TYPES);
        input.style().set_property("display", "none").ok()?;

        let (chosen_tx, chosen_rx) = oneshot::channel::<Option<web_sys::File>>();
        let chosen_tx = Rc::new(RefCell::new(Some(chosen_tx)));
        let picked_tx = chosen_tx.clone();
        let on_change = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let file = event
                .target()
                .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
                .and_then(|input| input.files())
                .and_then(|files| files.get(0));
            if let Some(tx) = picked_tx.borrow_mut().take() {
                let _ = tx.send(file);
            }
        });
        let dismissed_tx = chosen_tx.clone();
        let on_cancel = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
            if let Some(tx) = dismissed_tx.borrow_mut().take() {
                let _ = tx.send(None);
            }
        });
        input.set_onchange(Some(on_change.as_ref().unchecked_ref()));
        input
            .add_event_listener_with_callback("cancel", on_cancel.as_ref().unchecked_ref())
            .ok()?;
        on_change.forget();
        on_cancel.forget();

        body.append_child(&input).ok()?;
        input.click();
        let file = chosen_rx.await.ok().flatten();
        let _ = body.remove_child(&input);
        file
    }

    /// Reads the whole file as UTF-8 text.
    pub async fn read_text(file: web_sys::File) -> Result<String, String> {
        let reader = web_sys::FileReader::new().map_err(|err| format!("{err:?}"))?;

        let done = js_sys::Promise::new(&mut |resolve, reject| {
            let result_reader = reader.clone();
            let on_load = Closure::<dyn FnMut(web_sys::ProgressEvent)>::new(move |_| {
                let text = result_reader.result().unwrap_or(JsValue::UNDEFINED);
                let _ = resolve.call1(&JsValue::NULL, &text);
            });
            let on_error = Closure::<dyn FnMut(web_sys::ProgressEvent)>::new(move |_| {
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("file could not be read"));
            });
            reader.set_onload(Some(on_load.as_ref().unchecked_ref()));
            reader.set_onerror(Some(on_error.as_ref().unchecked_ref()));
            on_load.forget();
            on_error.forget();
        });

        reader.read_as_text(&file).map_err(|err| format!("{err:?}"))?;
        wasm_bindgen_futures::JsFuture::from(done)
            .await
            .map_err(|err| format!("{err:?}"))?
            .as_string()
            .ok_or_else(|| format!("{} is not a text file", file.name()))
    }
}
