use async_trait::async_trait;
use sc_api_types::{BridgeMethod, RpcRequestEnvelope};
use sc_bridge::{BridgeError, BridgeResult, RpcBridge, RpcTransport, unwrap_envelope};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_SIGNER_URL: &str = "http://localhost:3000/rpc";

/// JSON-RPC over HTTP to a remote signer.
///
/// Reads `SATS_CONNECT_SIGNER_URL` from environment at construction time
/// (default: `http://localhost:3000/rpc`).
pub struct HttpSignerTransport {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for HttpSignerTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpSignerTransport {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("SATS_CONNECT_SIGNER_URL").ok())
            .unwrap_or_else(|| DEFAULT_SIGNER_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub type HttpSignerBridge = RpcBridge<HttpSignerTransport>;

pub fn http_signer_bridge(endpoint: Option<String>) -> HttpSignerBridge {
    RpcBridge::new(HttpSignerTransport::new(endpoint))
}

#[async_trait]
impl RpcTransport for HttpSignerTransport {
    async fn call(&self, method: BridgeMethod, params: Value) -> BridgeResult<Value> {
        let request = RpcRequestEnvelope {
            jsonrpc: "2.0",
            id: Uuid::new_v4().to_string(),
            method: method.as_str().to_owned(),
            params,
        };
        debug!("signer request {} id={}", method, request.id);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| BridgeError::transport(method, err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| BridgeError::transport(method, format!("failed to read signer response: {err}")))?;

        // Signers answer protocol errors with an envelope even on non-2xx.
        match serde_json::from_str::<Value>(&text) {
            Ok(raw) if raw.get("result").is_some() || raw.get("error").is_some() => {
                unwrap_envelope(method, raw)
            }
            _ if !status.is_success() => {
                warn!("signer {} HTTP {}: {}", method, status, text);
                Err(BridgeError::transport(method, format!("HTTP {status}: {text}")))
            }
            Ok(raw) => unwrap_envelope(method, raw),
            Err(err) => Err(BridgeError::Decode {
                method,
                message: format!("invalid JSON from signer: {err}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use sc_api_types::{AddressPurpose, GetAddressesParams};
    use sc_bridge::WalletBridge;
    use serde_json::json;
    use std::io::{Read, Write};

    async fn signer(Json(request): Json<Value>) -> (StatusCode, Json<Value>) {
        let id = request["id"].clone();
        match request["method"].as_str() {
            Some("getAddresses") => (
                StatusCode::OK,
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": { "addresses": [
                        { "address": "bc1qpay", "purpose": "payment", "addressType": "p2wpkh" },
                        { "address": "bc1pord", "purpose": "ordinals" }
                    ] }
                })),
            ),
            Some("stx_getAddresses") => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32002, "message": "access denied" }
                })),
            ),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("boom"))),
        }
    }

    async fn spawn_signer() -> anyhow::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new().route("/rpc", post(signer));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{addr}/rpc"))
    }

    #[tokio::test]
    async fn decodes_success_envelope() -> anyhow::Result<()> {
        let bridge = http_signer_bridge(Some(spawn_signer().await?));

        let result = bridge
            .get_addresses(GetAddressesParams {
                purposes: vec![AddressPurpose::Ordinals, AddressPurpose::Payment],
                message: None,
            })
            .await?;

        assert_eq!(result.addresses.len(), 2);
        assert_eq!(result.addresses[0].address_type.as_deref(), Some("p2wpkh"));
        Ok(())
    }

    #[tokio::test]
    async fn error_envelope_is_rejection_even_on_http_error() -> anyhow::Result<()> {
        let bridge = http_signer_bridge(Some(spawn_signer().await?));

        let err = bridge.stx_get_addresses().await.expect_err("should be rejected");
        assert!(err.is_rejection());
        Ok(())
    }

    #[tokio::test]
    async fn bare_http_failure_is_transport_error() -> anyhow::Result<()> {
        let bridge = http_signer_bridge(Some(spawn_signer().await?));

        let err = bridge.disconnect().await.expect_err("should fail");
        assert!(matches!(err, BridgeError::Transport { method: BridgeMethod::Disconnect, .. }));
        Ok(())
    }

    /// One-shot HTTP server that announces a longer body than it sends.
    fn spawn_truncating_signer() -> anyhow::Result<String> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        std::thread::spawn(move || {
            let Ok((mut socket, _)) = listener.accept() else {
                return;
            };
            read_request(&mut socket);
            let _ = socket.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 128\r\n\r\n{\"result\":",
            );
            let _ = socket.shutdown(std::net::Shutdown::Both);
        });
        Ok(format!("http://{addr}/rpc"))
    }

    fn read_request(socket: &mut std::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let Ok(read) = socket.read(&mut chunk) else {
                return;
            };
            if read == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..read]);
            let raw = String::from_utf8_lossy(&buf);
            if let Some(end) = raw.find("\r\n\r\n") {
                let length = raw[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn truncated_body_is_transport_error() -> anyhow::Result<()> {
        let bridge = http_signer_bridge(Some(spawn_truncating_signer()?));

        let err = bridge.stx_get_addresses().await.expect_err("body is cut short");
        assert!(matches!(err, BridgeError::Transport { method: BridgeMethod::StxGetAddresses, .. }));
        Ok(())
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let transport = HttpSignerTransport::new(Some("http://signer.local/rpc/".to_owned()));
        assert_eq!(transport.endpoint(), "http://signer.local/rpc");
    }
}
