//! Injected wallet provider.
//!
//! Xverse-compatible extensions expose `window.XverseProviders.BitcoinProvider`
//! with a promise-returning `request(method, params)`. The promise resolves
//! to a `{ result } | { error }` envelope.

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use sc_api_types::BridgeMethod;
use sc_bridge::{BridgeError, BridgeResult, RpcTransport, unwrap_envelope};
use sc_connect::{Failure, FailureSink};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub const PROVIDERS_KEY: &str = "XverseProviders";
pub const BITCOIN_PROVIDER_KEY: &str = "BitcoinProvider";

#[derive(Debug, Clone, Copy)]
pub struct InjectedProviderTransport {
    providers_key: &'static str,
    provider_key: &'static str,
}

impl Default for InjectedProviderTransport {
    fn default() -> Self {
        Self {
            providers_key: PROVIDERS_KEY,
            provider_key: BITCOIN_PROVIDER_KEY,
        }
    }
}

impl InjectedProviderTransport {
    fn provider(&self, method: BridgeMethod) -> BridgeResult<JsValue> {
        let window = web_sys::window().ok_or_else(|| BridgeError::transport(method, "no window object"))?;
        let providers = Reflect::get(&window, &JsValue::from_str(self.providers_key))
            .map_err(|e| BridgeError::transport(method, format!("{:?}", e)))?;
        if providers.is_undefined() || providers.is_null() {
            return Err(BridgeError::transport(method, "no wallet extension detected"));
        }

        let provider = Reflect::get(&providers, &JsValue::from_str(self.provider_key))
            .map_err(|e| BridgeError::transport(method, format!("{:?}", e)))?;
        if provider.is_undefined() || provider.is_null() {
            return Err(BridgeError::transport(
                method,
                format!("{} does not expose {}", self.providers_key, self.provider_key),
            ));
        }
        Ok(provider)
    }

    async fn request(&self, method: BridgeMethod, params: JsValue) -> BridgeResult<JsValue> {
        let provider = self.provider(method)?;
        let request = Reflect::get(&provider, &JsValue::from_str("request"))
            .map_err(|e| BridgeError::transport(method, format!("{:?}", e)))?
            .dyn_into::<Function>()
            .map_err(|_| BridgeError::transport(method, "provider.request is not a function"))?;

        let args = Array::of2(&JsValue::from_str(method.as_str()), &params);
        let returned = request
            .apply(&provider, &args)
            .map_err(|e| BridgeError::transport(method, format!("{:?}", e)))?;

        if !returned.has_type::<Promise>() {
            return Ok(returned);
        }
        let promise = returned
            .dyn_into::<Promise>()
            .map_err(|e| BridgeError::transport(method, format!("{:?}", e)))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| BridgeError::transport(method, format!("promise rejected: {:?}", e)))
    }
}

#[async_trait(?Send)]
impl RpcTransport for InjectedProviderTransport {
    async fn call(&self, method: BridgeMethod, params: Value) -> BridgeResult<Value> {
        let params = if params.is_null() {
            JsValue::UNDEFINED
        } else {
            params
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(|e| BridgeError::Decode {
                    method,
                    message: e.to_string(),
                })?
        };

        let raw = self.request(method, params).await?;
        let raw: Value = serde_wasm_bindgen::from_value(raw).map_err(|e| BridgeError::Decode {
            method,
            message: e.to_string(),
        })?;
        unwrap_envelope(method, raw)
    }
}

/// Failures go to the browser console; user-facing ones also raise `alert()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSink;

impl FailureSink for BrowserSink {
    fn log(&self, failure: &Failure) {
        gloo_console::error!(failure.to_string());
    }

    fn alert(&self, failure: &Failure) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(failure.step.message());
        }
    }
}
