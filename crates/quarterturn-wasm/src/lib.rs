//! Quarterturn WASM - WebAssembly bindings for Quarterturn
//!
//! This crate drives the quarterturn-core rotation engine from a browser page:
//! it finds the thumbnails, renders selection and rotation previews, and sends
//! rotation requests with `fetch`.
//!
//! # Module Structure
//!
//! - `rotator` - The `ImageRotator` class and its event wiring
//! - `dom` - Thumbnail enumeration and the DOM-backed surface
//! - `fetch` - `fetch`-based rotation backend
//! - `logger` - Forwards `log` records to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { mount } from '@quarterturn/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! // Bind thumbnails and the rotate/save/cancel buttons
//! const rotator = mount({ anglePolicy: 'wrap' });
//! ```

use log::LevelFilter;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

mod dom;
mod fetch;
mod logger;
mod rotator;

pub use dom::DomSurface;
pub use fetch::FetchBackend;
pub use rotator::ImageRotator;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(LevelFilter::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Create a rotator and bind it to the page in one step.
///
/// # Errors
/// Returns error if the config is invalid or there is no document
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<ImageRotator, JsValue> {
    let mut rotator = ImageRotator::new(config)?;
    rotator.attach()?;
    Ok(rotator)
}

/// Change the console log level (`off`, `error`, `warn`, `info`, `debug`, `trace`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level = parse_level(level).map_err(|e| JsValue::from_str(&e))?;
    log::set_max_level(level);
    Ok(())
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(level).map_err(|_| format!("Unknown log level: {}", level))
}
