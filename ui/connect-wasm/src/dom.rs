//! DOM element bindings.
//!
//! All fields are resolved once at startup. To add new UI elements, add a
//! field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlOptionElement, HtmlSelectElement};

// ── Helpers ──

pub fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window object"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn by_id(id: &str) -> Option<Element> {
    document().ok()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn clear(el: &Element) {
    el.set_inner_html("");
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document()?.create_element(tag)
}

pub fn create_option(value: &str, text: &str, selected: bool) -> Result<HtmlOptionElement, JsValue> {
    let opt: HtmlOptionElement = create_element("option")?.dyn_into()?;
    opt.set_value(value);
    opt.set_text_content(Some(text));
    opt.set_selected(selected);
    Ok(opt)
}

// ── Elements struct ──

/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Connect prompt
    pub connect_view: Element,
    pub network_select: HtmlSelectElement,
    pub connect_btn: HtmlButtonElement,
    pub connect_legacy_btn: HtmlButtonElement,

    // Dashboard
    pub dashboard_view: Element,
    pub network_label: Element,
    pub address_list: Element,
    pub runes_list: Element,
    pub disconnect_btn: HtmlButtonElement,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_button {
    ($id:expr) => {
        by_id_typed::<HtmlButtonElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing button #{}", $id)))?
    };
}

macro_rules! get_select {
    ($id:expr) => {
        by_id_typed::<HtmlSelectElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing select #{}", $id)))?
    };
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            connect_view: get_el!("connectView"),
            network_select: get_select!("networkSelect"),
            connect_btn: get_button!("connectBtn"),
            connect_legacy_btn: get_button!("connectLegacyBtn"),

            dashboard_view: get_el!("dashboardView"),
            network_label: get_el!("networkLabel"),
            address_list: get_el!("addressList"),
            runes_list: get_el!("runesList"),
            disconnect_btn: get_button!("disconnectBtn"),
        })
    }

    pub fn action_buttons(&self) -> [&HtmlButtonElement; 3] {
        [&self.connect_btn, &self.connect_legacy_btn, &self.disconnect_btn]
    }
}
