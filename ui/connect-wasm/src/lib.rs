//! SatsConnect demo frontend.
//!
//! Pure Rust + WASM. Shows a connect prompt until at least one address
//! slot is populated, then the connected dashboard. Browser-only: the crate
//! is empty on other targets.
#![cfg(target_arch = "wasm32")]

pub mod dom;
pub mod events;
pub mod provider;
pub mod render;
pub mod state;
pub mod storage;

use wasm_bindgen::prelude::*;

/// WASM entry point, called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init()
}

fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    // Restores every slot from localStorage; no provider call happens here.
    let controller = state::controller();
    render::fill_network_options(&els)?;
    render::render(&els, &controller.snapshot())?;

    events::bind_events(&els)?;
    events::watch_connection(&els);

    Ok(())
}
