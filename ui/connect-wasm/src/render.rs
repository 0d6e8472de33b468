//! Snapshot → DOM.

use sc_api_types::{Address, BitcoinNetworkType};
use sc_connect::ConnectionSnapshot;
use wasm_bindgen::JsValue;
use web_sys::Element;

use crate::dom::{self, Elements};

pub fn fill_network_options(els: &Elements) -> Result<(), JsValue> {
    dom::clear(&els.network_select);
    for network in BitcoinNetworkType::ALL {
        let opt = dom::create_option(network.as_str(), network.as_str(), false)?;
        els.network_select.add_with_html_option_element(&opt)?;
    }
    Ok(())
}

/// Connect prompt while no slot holds an address, dashboard otherwise.
pub fn render(els: &Elements, snapshot: &ConnectionSnapshot) -> Result<(), JsValue> {
    let connected = snapshot.is_connected();
    dom::toggle_class(&els.connect_view, "hidden", connected);
    dom::toggle_class(&els.dashboard_view, "hidden", !connected);

    els.network_select.set_value(snapshot.network.as_str());
    dom::set_text(&els.network_label, snapshot.network.as_str());

    render_addresses(&els.address_list, &snapshot.display_addresses())?;
    render_addresses(&els.runes_list, &snapshot.runes_addresses())
}

fn render_addresses(list: &Element, addresses: &[Address]) -> Result<(), JsValue> {
    dom::clear(list);
    for address in addresses {
        let item = dom::create_element("li")?;
        item.set_class_name("address");

        let value = dom::create_element("code")?;
        dom::set_text(&value, &address.address);
        let purpose = dom::create_element("span")?;
        purpose.set_class_name("purpose");
        dom::set_text(&purpose, address.purpose.as_str());

        item.append_child(&value)?;
        item.append_child(&purpose)?;
        list.append_child(&item)?;
    }
    Ok(())
}

pub fn set_busy(els: &Elements, busy: bool) {
    for btn in els.action_buttons() {
        btn.set_disabled(busy);
    }
}
