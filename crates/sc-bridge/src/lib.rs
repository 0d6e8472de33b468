//! Wallet provider bridge contract.
//!
//! [`WalletBridge`] is what the connection controller talks to. Concrete
//! providers usually only need to move JSON-RPC envelopes, so they implement
//! [`RpcTransport`] and get wrapped in [`RpcBridge`], which owns the typed
//! request/response mapping.

use async_trait::async_trait;
use sc_api_types::{
    Address, BridgeMethod, GetAccountsParams, GetAddressesParams, GetAddressesResult,
    RpcErrorPayload, RpcResponseEnvelope,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod scripted;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// The provider answered with an error tag (user declined, no account, ...).
    #[error("{method} rejected by wallet: {} (code {})", .payload.message, .payload.code)]
    Rejected {
        method: BridgeMethod,
        payload: RpcErrorPayload,
    },
    /// The call itself blew up before a tagged answer came back.
    #[error("{method} transport failure: {message}")]
    Transport { method: BridgeMethod, message: String },
    #[error("{method} returned an unexpected payload: {message}")]
    Decode { method: BridgeMethod, message: String },
}

impl BridgeError {
    pub fn method(&self) -> BridgeMethod {
        match self {
            BridgeError::Rejected { method, .. }
            | BridgeError::Transport { method, .. }
            | BridgeError::Decode { method, .. } => *method,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, BridgeError::Rejected { .. })
    }

    pub fn transport(method: BridgeMethod, message: impl Into<String>) -> Self {
        BridgeError::Transport {
            method,
            message: message.into(),
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WalletBridge: Send + Sync {
    async fn request_permissions(&self) -> BridgeResult<()>;
    async fn get_accounts(&self, params: GetAccountsParams) -> BridgeResult<Vec<Address>>;
    async fn get_addresses(&self, params: GetAddressesParams) -> BridgeResult<GetAddressesResult>;
    async fn stx_get_addresses(&self) -> BridgeResult<GetAddressesResult>;
    async fn disconnect(&self) -> BridgeResult<()>;
}

/// Raw request/response channel to a provider.
///
/// `call` returns the `result` member of a successful response; an `error`
/// member must come back as [`BridgeError::Rejected`].
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: BridgeMethod, params: Value) -> BridgeResult<Value>;
}

/// Split a `{ result } | { error }` envelope into a bridge result.
pub fn unwrap_envelope(method: BridgeMethod, raw: Value) -> BridgeResult<Value> {
    let envelope: RpcResponseEnvelope = serde_json::from_value(raw).map_err(|err| BridgeError::Decode {
        method,
        message: err.to_string(),
    })?;

    match (envelope.error, envelope.result) {
        (Some(payload), _) => Err(BridgeError::Rejected { method, payload }),
        (None, Some(result)) => Ok(result),
        (None, None) => Ok(Value::Null),
    }
}

pub struct RpcBridge<T> {
    transport: T,
}

impl<T> RpcBridge<T>
where
    T: RpcTransport,
{
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn invoke<R: DeserializeOwned>(&self, method: BridgeMethod, params: Value) -> BridgeResult<R> {
        debug!("wallet request: {}", method);
        let result = self.transport.call(method, params).await?;
        serde_json::from_value(result).map_err(|err| BridgeError::Decode {
            method,
            message: err.to_string(),
        })
    }
}

fn to_params<P: serde::Serialize>(method: BridgeMethod, params: &P) -> BridgeResult<Value> {
    serde_json::to_value(params).map_err(|err| BridgeError::Decode {
        method,
        message: err.to_string(),
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T> WalletBridge for RpcBridge<T>
where
    T: RpcTransport,
{
    async fn request_permissions(&self) -> BridgeResult<()> {
        self.invoke::<Value>(BridgeMethod::RequestPermissions, Value::Null)
            .await
            .map(|_| ())
    }

    async fn get_accounts(&self, params: GetAccountsParams) -> BridgeResult<Vec<Address>> {
        let params = to_params(BridgeMethod::GetAccounts, &params)?;
        self.invoke(BridgeMethod::GetAccounts, params).await
    }

    async fn get_addresses(&self, params: GetAddressesParams) -> BridgeResult<GetAddressesResult> {
        let params = to_params(BridgeMethod::GetAddresses, &params)?;
        self.invoke(BridgeMethod::GetAddresses, params).await
    }

    async fn stx_get_addresses(&self) -> BridgeResult<GetAddressesResult> {
        self.invoke(BridgeMethod::StxGetAddresses, Value::Null).await
    }

    async fn disconnect(&self) -> BridgeResult<()> {
        self.invoke::<Value>(BridgeMethod::Disconnect, Value::Null)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedTransport;
    use sc_api_types::AddressPurpose;
    use serde_json::json;

    #[test]
    fn envelope_error_becomes_rejection() {
        let raw = json!({ "jsonrpc": "2.0", "id": "1", "error": { "code": -32000, "message": "User rejected" } });
        let err = unwrap_envelope(BridgeMethod::GetAddresses, raw).expect_err("should reject");
        assert!(err.is_rejection());
        assert_eq!(err.method(), BridgeMethod::GetAddresses);
    }

    #[test]
    fn envelope_result_is_unwrapped() {
        let raw = json!({ "jsonrpc": "2.0", "id": "1", "result": { "addresses": [] } });
        let value = unwrap_envelope(BridgeMethod::StxGetAddresses, raw).expect("result");
        assert_eq!(value, json!({ "addresses": [] }));
    }

    #[test]
    fn non_object_envelope_is_decode_error() {
        let err = unwrap_envelope(BridgeMethod::Disconnect, json!("nope")).expect_err("decode");
        assert!(matches!(err, BridgeError::Decode { .. }));
    }

    #[tokio::test]
    async fn get_addresses_sends_purposes_and_decodes_result() {
        let transport = ScriptedTransport::new();
        transport.respond(
            BridgeMethod::GetAddresses,
            json!({ "addresses": [{ "address": "bc1pord", "purpose": "ordinals" }] }),
        );
        let bridge = RpcBridge::new(transport);

        let result = bridge
            .get_addresses(GetAddressesParams {
                purposes: vec![AddressPurpose::Ordinals, AddressPurpose::Payment],
                message: None,
            })
            .await
            .expect("addresses");

        assert_eq!(result.addresses, vec![Address::new("bc1pord", AddressPurpose::Ordinals)]);
        assert_eq!(
            bridge.transport().params(BridgeMethod::GetAddresses),
            Some(json!({ "purposes": ["ordinals", "payment"] }))
        );
    }

    #[tokio::test]
    async fn malformed_accounts_are_decode_errors() {
        let transport = ScriptedTransport::new();
        transport.respond(BridgeMethod::GetAccounts, json!({ "unexpected": true }));
        let bridge = RpcBridge::new(transport);

        let err = bridge
            .get_accounts(GetAccountsParams {
                purposes: vec![AddressPurpose::Payment],
                message: "hi".to_owned(),
            })
            .await
            .expect_err("decode failure");
        assert!(matches!(err, BridgeError::Decode { method: BridgeMethod::GetAccounts, .. }));
    }
}
