//! Retrieving dataset text over HTTP or from disk.
//!
//! Native builds accept `http(s)://` URLs (fetched with `reqwest`) and local file
//! paths. In the browser every location is fetched with the Fetch API, relative
//! to the page.

use crate::dataset::{parse_dataset, DatasetError};
use crate::types::Dataset;

/// Fetches and parses the dataset at `location`.
pub async fn load_dataset(location: &str) -> Result<Dataset, DatasetError> {
    log::info!("loading dataset from {location}");
    let text = fetch_text(location).await?;
    parse_dataset(&text)
}

/// Whether `location` should be requested over HTTP rather than read from disk.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(not(target_arch = "wasm32"))]
async fn fetch_text(location: &str) -> Result<String, DatasetError> {
    if !is_remote(location) {
        return tokio::fs::read_to_string(location)
            .await
            .map_err(|source| DatasetError::Io {
                path: location.to_string(),
                source,
            });
    }

    let fetch_error = |err: reqwest::Error| DatasetError::Fetch {
        location: location.to_string(),
        message: err.to_string(),
    };
    let response = reqwest::get(location).await.map_err(fetch_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(DatasetError::Status {
            location: location.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(fetch_error)
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(location: &str) -> Result<String, DatasetError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_error = |value: wasm_bindgen::JsValue| DatasetError::Fetch {
        location: location.to_string(),
        message: format!("{value:?}"),
    };

    let window = web_sys::window().ok_or_else(|| DatasetError::Fetch {
        location: location.to_string(),
        message: "no window available".to_string(),
    })?;

    let init = web_sys::RequestInit::new();
    init.set_method("GET");
    init.set_mode(web_sys::RequestMode::Cors);
    let request = web_sys::Request::new_with_str_and_init(location, &init).map_err(js_error)?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    if !response.ok() {
        return Err(DatasetError::Status {
            location: location.to_string(),
            status: response.status(),
        });
    }

    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    text.as_string().ok_or_else(|| DatasetError::Fetch {
        location: location.to_string(),
        message: "response body is not text".to_string(),
    })
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn recognizes_remote_locations() {
        assert!(is_remote("https://example.org/city.geojson"));
        assert!(is_remote("http://localhost:8000/city.geojson"));
        assert!(!is_remote("data/bucharest.geojson"));
    }

    #[tokio::test]
    async fn loads_bundled_dataset_from_disk() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/bucharest.geojson");
        let dataset = load_dataset(path).await.expect("bundled dataset should load");
        assert!(!dataset.features.is_empty());
        assert!(dataset.bounds.is_some());
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = load_dataset("/nonexistent/city.geojson").await.unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
