/// Save to Pocket - Browser Extension
/// Built with Rust + WASM + Yew

mod actions;
mod background;
mod classify;
mod config;
mod content;
mod dispatcher;
mod error;
mod host;
mod injector;
mod js;
mod menus;
mod session;
mod tab_data;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export URL classification for the JS bridge (popup, options page)
#[wasm_bindgen]
pub fn is_system_url(url: &str) -> bool {
    classify::is_system_link(url)
}

// Start the background dispatcher. `config` may override service URLs.
#[wasm_bindgen]
pub fn start_background(config: JsValue) {
    background::start(config);
}

// Start the content script in the current page
#[wasm_bindgen]
pub fn start_content() {
    content::start();
}
