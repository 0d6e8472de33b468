//! Event binding.
//!
//! Wires all UI event listeners. Wallet operations run through
//! `wasm_bindgen_futures::spawn_local`; rendering is driven by the
//! connection state's change channel, not by the handlers.

use sc_api_types::BitcoinNetworkType;
use sc_connect::Outcome;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom::Elements;
use crate::render;
use crate::state;

/// Helper: attach async click handler to an element.
macro_rules! on_click_async {
    ($el:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    on_click_async!(els.connect_btn, els, on_connect);
    on_click_async!(els.connect_legacy_btn, els, on_connect_legacy);
    on_click_async!(els.disconnect_btn, els, on_disconnect);

    // ── Network ──
    {
        let els2 = els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            on_network_change(&els2);
        }) as Box<dyn FnMut(_)>);
        els.network_select
            .add_event_listener_with_callback("change", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    Ok(())
}

/// Re-render on every committed change for the lifetime of the page.
pub fn watch_connection(els: &Elements) {
    let els = els.clone();
    let mut changes = state::controller().state().subscribe();
    wasm_bindgen_futures::spawn_local(async move {
        while changes.changed().await.is_ok() {
            let snapshot = changes.borrow_and_update().clone();
            if let Err(e) = render::render(&els, &snapshot) {
                gloo_console::error!("render failed:", e);
            }
        }
    });
}

async fn on_connect(els: &Elements) {
    render::set_busy(els, true);
    let outcome = state::controller().connect_standard().await;
    render::set_busy(els, false);
    report(outcome);
}

async fn on_connect_legacy(els: &Elements) {
    render::set_busy(els, true);
    let outcome = state::controller().connect_legacy().await;
    render::set_busy(els, false);
    report(outcome);
}

async fn on_disconnect(els: &Elements) {
    render::set_busy(els, true);
    let outcome = state::controller().disconnect().await;
    render::set_busy(els, false);
    report(outcome);
}

fn on_network_change(els: &Elements) {
    match els.network_select.value().parse::<BitcoinNetworkType>() {
        Ok(network) => state::controller().select_network(network),
        Err(e) => {
            gloo_console::warn!(e);
        }
    }
}

// Failures were already routed through the controller's sink.
fn report(outcome: Outcome) {
    match outcome {
        Outcome::Busy => {
            gloo_console::warn!("another wallet operation is in progress");
        }
        Outcome::Superseded => {
            gloo_console::warn!("wallet was disconnected before the operation finished");
        }
        _ => {}
    }
}
