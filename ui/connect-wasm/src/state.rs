//! Application-wide controller.
//!
//! Uses `thread_local!` storage (WASM is single-threaded). The controller
//! is built lazily on first access from the browser-backed store and the
//! injected wallet provider.

use sc_bridge::RpcBridge;
use sc_connect::ConnectionController;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::provider::{BrowserSink, InjectedProviderTransport};
use crate::storage::LocalStore;

pub type WebController = ConnectionController<RpcBridge<InjectedProviderTransport>>;

thread_local! {
    static CONTROLLER: RefCell<Option<Rc<WebController>>> = const { RefCell::new(None) };
}

pub fn controller() -> Rc<WebController> {
    CONTROLLER.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| {
                Rc::new(ConnectionController::new(
                    RpcBridge::new(InjectedProviderTransport::default()),
                    Arc::new(LocalStore),
                    Arc::new(BrowserSink),
                ))
            })
            .clone()
    })
}
