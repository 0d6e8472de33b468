mod config;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use sc_api_types::{
    BitcoinNetworkType, ConnectionResponse, OperationResponse, SelectNetworkRequest,
};
use sc_bridge::WalletBridge;
use sc_bridge_rpc::http_signer_bridge;
use sc_connect::{ConnectionController, Outcome, TracingSink};
use sc_storage::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::ServiceConfig;

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    error: String,
}

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

type AppState<B> = Arc<ConnectionController<B>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from_env()?;
    let store = open_store(&config.store_path)?;
    let bridge = http_signer_bridge(config.signer_url.clone());
    info!("using wallet signer at {}", bridge.transport().endpoint());

    let controller = Arc::new(ConnectionController::new(bridge, store, Arc::new(TracingSink)));
    let snapshot = controller.snapshot();
    info!(
        "restored connection state: connected={} network={}",
        snapshot.is_connected(),
        snapshot.network
    );

    let app = router(controller).layer(CorsLayer::permissive());

    info!("connect-service listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(not(feature = "rocksdb"))]
fn open_store(path: &str) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store = sc_storage::FileStore::open(path)?;
    info!("persisting connection state to {}", store.path().display());
    Ok(Arc::new(store))
}

#[cfg(feature = "rocksdb")]
fn open_store(path: &str) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    info!("persisting connection state to RocksDB at {}", path);
    Ok(Arc::new(sc_storage::RocksDbStore::open_default(path)?))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

pub(crate) fn router<B>(controller: AppState<B>) -> Router
where
    B: WalletBridge + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/connection", get(connection::<B>))
        .route("/connection/connect", post(connect::<B>))
        .route("/connection/connect-legacy", post(connect_legacy::<B>))
        .route("/connection/disconnect", post(disconnect::<B>))
        .route("/connection/network", put(select_network::<B>))
        .with_state(controller)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "connect-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "connect-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn connection<B: WalletBridge + 'static>(
    State(controller): State<AppState<B>>,
) -> Json<ConnectionResponse> {
    Json(controller.snapshot().to_response())
}

async fn connect<B: WalletBridge + 'static>(
    State(controller): State<AppState<B>>,
) -> Json<OperationResponse> {
    let outcome = controller.connect_standard().await;
    Json(operation_response(&controller, outcome))
}

async fn connect_legacy<B: WalletBridge + 'static>(
    State(controller): State<AppState<B>>,
) -> Json<OperationResponse> {
    let outcome = controller.connect_legacy().await;
    Json(operation_response(&controller, outcome))
}

async fn disconnect<B: WalletBridge + 'static>(
    State(controller): State<AppState<B>>,
) -> Json<OperationResponse> {
    let outcome = controller.disconnect().await;
    Json(operation_response(&controller, outcome))
}

async fn select_network<B: WalletBridge + 'static>(
    State(controller): State<AppState<B>>,
    Json(request): Json<SelectNetworkRequest>,
) -> ApiResult<ConnectionResponse> {
    let network: BitcoinNetworkType = request.network.parse().map_err(|err: String| bad_request(&err))?;
    controller.select_network(network);
    Ok(Json(controller.snapshot().to_response()))
}

fn operation_response<B: WalletBridge>(
    controller: &ConnectionController<B>,
    outcome: Outcome,
) -> OperationResponse {
    let message = match &outcome {
        Outcome::Busy => Some("another wallet operation is in progress".to_owned()),
        Outcome::Superseded => Some("wallet was disconnected before the operation finished".to_owned()),
        other => other.failure().map(ToString::to_string),
    };

    OperationResponse {
        outcome: outcome.kind(),
        message,
        connection: controller.snapshot().to_response(),
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request};
    use sc_api_types::{BridgeMethod, OutcomeKind};
    use sc_bridge::RpcBridge;
    use sc_bridge::scripted::ScriptedTransport;
    use sc_connect::RecordingSink;
    use sc_storage::{FileStore, InMemoryStore};
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    type TestController = ConnectionController<RpcBridge<ScriptedTransport>>;

    fn scripted_controller(store: Arc<dyn KeyValueStore>) -> Arc<TestController> {
        Arc::new(ConnectionController::new(
            RpcBridge::new(ScriptedTransport::new()),
            store,
            Arc::new(RecordingSink::new()),
        ))
    }

    fn script_standard_success(controller: &TestController) {
        controller
            .bridge()
            .transport()
            .respond(BridgeMethod::RequestPermissions, json!(true))
            .respond(
                BridgeMethod::GetAddresses,
                json!({ "addresses": [
                    { "address": "bc1pord", "purpose": "ordinals" },
                    { "address": "3Pay", "purpose": "payment" }
                ] }),
            )
            .respond(
                BridgeMethod::StxGetAddresses,
                json!({ "addresses": [{ "address": "SPSTX", "purpose": "stacks" }] }),
            );
    }

    async fn send<T: DeserializeOwned>(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, T)> {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body)?).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    #[tokio::test]
    async fn health_reports_ok() -> anyhow::Result<()> {
        let app = router(scripted_controller(Arc::new(InMemoryStore::new())));
        let (status, body): (_, Value) = send(&app, Method::GET, "/health", None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn fresh_service_is_disconnected_on_mainnet() -> anyhow::Result<()> {
        let app = router(scripted_controller(Arc::new(InMemoryStore::new())));
        let (_, body): (_, ConnectionResponse) = send(&app, Method::GET, "/connection", None).await?;
        assert!(!body.is_connected);
        assert_eq!(body.network, BitcoinNetworkType::Mainnet);
        Ok(())
    }

    #[tokio::test]
    async fn connect_then_disconnect_over_http() -> anyhow::Result<()> {
        let controller = scripted_controller(Arc::new(InMemoryStore::new()));
        script_standard_success(&controller);
        let app = router(controller);

        let (status, body): (_, OperationResponse) =
            send(&app, Method::POST, "/connection/connect", None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.outcome, OutcomeKind::Ok);
        assert!(body.connection.is_connected);
        assert_eq!(body.connection.btc_addresses.len(), 2);
        assert_eq!(body.connection.display_addresses.len(), 3);
        assert_eq!(body.connection.runes_addresses.len(), 2);

        let (_, body): (_, OperationResponse) =
            send(&app, Method::POST, "/connection/disconnect", None).await?;
        assert_eq!(body.outcome, OutcomeKind::Ok);
        assert!(!body.connection.is_connected);
        Ok(())
    }

    #[tokio::test]
    async fn failed_legacy_connect_reports_silent_failure() -> anyhow::Result<()> {
        let controller = scripted_controller(Arc::new(InMemoryStore::new()));
        controller
            .bridge()
            .transport()
            .reject(BridgeMethod::GetAccounts, 4, "declined");
        let app = router(controller);

        let (_, body): (_, OperationResponse) =
            send(&app, Method::POST, "/connection/connect-legacy", None).await?;
        assert_eq!(body.outcome, OutcomeKind::SilentFailure);
        assert!(body.message.is_some());
        assert!(body.connection.legacy_addresses.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn network_selection_validates_input() -> anyhow::Result<()> {
        let app = router(scripted_controller(Arc::new(InMemoryStore::new())));

        let (status, _): (_, Value) = send(
            &app,
            Method::PUT,
            "/connection/network",
            Some(json!({ "network": "dogecoin" })),
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body): (_, ConnectionResponse) = send(
            &app,
            Method::PUT,
            "/connection/network",
            Some(json!({ "network": "testnet" })),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.network, BitcoinNetworkType::Testnet);
        Ok(())
    }

    #[tokio::test]
    async fn connection_survives_service_restart() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("connection.json");

        let controller = scripted_controller(Arc::new(FileStore::open(&path)?));
        script_standard_success(&controller);
        let app = router(controller);
        let _: (_, OperationResponse) = send(&app, Method::POST, "/connection/connect", None).await?;
        drop(app);

        let app = router(scripted_controller(Arc::new(FileStore::open(&path)?)));
        let (_, body): (_, ConnectionResponse) = send(&app, Method::GET, "/connection", None).await?;
        assert!(body.is_connected);
        assert_eq!(body.stx_addresses.len(), 1);
        Ok(())
    }
}
