#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    // Set up logging; RUST_LOG controls the level
    env_logger::init();

    // Run the map application
    city_buffers::run_app()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast;

    eframe::WebLogger::init(log::LevelFilter::Info).ok();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            log::error!("no document to attach the map to");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("the_canvas_id")
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("missing canvas element `the_canvas_id`");
            return;
        };

        let config = city_buffers::AppConfig::default();
        let result = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(city_buffers::CityBuffersApp::new(cc, config)))),
            )
            .await;
        if let Err(err) = result {
            log::error!("failed to start the map: {err:?}");
        }
    });
}
