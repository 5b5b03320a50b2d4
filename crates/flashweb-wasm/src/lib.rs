//! flashweb-wasm - browser front-end for flashweb
//!
//! Renders the operation form and the notification log with egui on the
//! `flashweb_canvas` element, and posts submissions to the relay that served
//! the page.

#![warn(missing_docs)]

mod app;

pub use app::FlashwebApp;

use wasm_bindgen::prelude::*;

/// Id of the canvas element hosting the console
const CANVAS_ID: &str = "flashweb_canvas";

/// Initialize the web application
///
/// This is the entry point called from the HTML page.
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Fails only if a logger is already installed
    console_log::init_with_level(log::Level::Debug).ok();

    log::info!("flashweb-wasm starting...");

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let window = web_sys::window();
        let origin = window
            .as_ref()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
        let canvas = window
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CANVAS_ID))
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok());
        let Some(canvas) = canvas else {
            log::error!("Canvas element '{}' not found", CANVAS_ID);
            return;
        };

        let result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(FlashwebApp::new(cc, &origin)))),
            )
            .await;

        if let Err(e) = result {
            log::error!("Failed to start eframe: {:?}", e);
        }
    });
}
