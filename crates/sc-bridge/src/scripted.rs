//! Deterministic transport with queued answers, for tests and offline demos.

use async_trait::async_trait;
use sc_api_types::{BridgeMethod, RpcErrorPayload};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use crate::{BridgeError, BridgeResult, RpcTransport};

#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<BridgeMethod, VecDeque<BridgeResult<Value>>>>,
    calls: Mutex<Vec<(BridgeMethod, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: BridgeMethod, result: Value) -> &Self {
        self.push(method, Ok(result))
    }

    pub fn reject(&self, method: BridgeMethod, code: i64, message: &str) -> &Self {
        self.push(
            method,
            Err(BridgeError::Rejected {
                method,
                payload: RpcErrorPayload {
                    code,
                    message: message.to_owned(),
                    data: None,
                },
            }),
        )
    }

    pub fn fail(&self, method: BridgeMethod, message: &str) -> &Self {
        self.push(method, Err(BridgeError::transport(method, message)))
    }

    /// Methods invoked so far, in call order.
    pub fn calls(&self) -> Vec<BridgeMethod> {
        let guard = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        guard.iter().map(|(method, _)| *method).collect()
    }

    /// Params of the most recent call to `method`.
    pub fn params(&self, method: BridgeMethod) -> Option<Value> {
        let guard = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .iter()
            .rev()
            .find(|(called, _)| *called == method)
            .map(|(_, params)| params.clone())
    }

    fn push(&self, method: BridgeMethod, result: BridgeResult<Value>) -> &Self {
        let mut guard = self.queued.lock().unwrap_or_else(PoisonError::into_inner);
        guard.entry(method).or_default().push_back(result);
        self
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RpcTransport for ScriptedTransport {
    async fn call(&self, method: BridgeMethod, params: Value) -> BridgeResult<Value> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((method, params));

        let next = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&method)
            .and_then(VecDeque::pop_front);

        next.unwrap_or_else(|| Err(BridgeError::transport(method, "no scripted response")))
    }
}
