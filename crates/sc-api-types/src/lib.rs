use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AddressPurpose {
    Payment,
    Ordinals,
    Stacks,
}

impl AddressPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressPurpose::Payment => "payment",
            AddressPurpose::Ordinals => "ordinals",
            AddressPurpose::Stacks => "stacks",
        }
    }
}

/// An address record exactly as the wallet provider returned it.
///
/// Only `address` and `purpose` are guaranteed; everything else is carried
/// through untouched so that a restored slot equals what was committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address: String,
    pub purpose: AddressPurpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
}

impl Address {
    pub fn new(address: impl Into<String>, purpose: AddressPurpose) -> Self {
        Self {
            address: address.into(),
            purpose,
            public_key: None,
            address_type: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BitcoinNetworkType {
    #[default]
    Mainnet,
    Testnet,
    Testnet4,
    Signet,
    Regtest,
}

impl BitcoinNetworkType {
    pub const ALL: [BitcoinNetworkType; 5] = [
        BitcoinNetworkType::Mainnet,
        BitcoinNetworkType::Testnet,
        BitcoinNetworkType::Testnet4,
        BitcoinNetworkType::Signet,
        BitcoinNetworkType::Regtest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BitcoinNetworkType::Mainnet => "Mainnet",
            BitcoinNetworkType::Testnet => "Testnet",
            BitcoinNetworkType::Testnet4 => "Testnet4",
            BitcoinNetworkType::Signet => "Signet",
            BitcoinNetworkType::Regtest => "Regtest",
        }
    }
}

impl fmt::Display for BitcoinNetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BitcoinNetworkType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|network| network.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown network: {trimmed}"))
    }
}

// ── Wallet provider RPC ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeMethod {
    RequestPermissions,
    GetAccounts,
    GetAddresses,
    StxGetAddresses,
    Disconnect,
}

impl BridgeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeMethod::RequestPermissions => "wallet_requestPermissions",
            BridgeMethod::GetAccounts => "getAccounts",
            BridgeMethod::GetAddresses => "getAddresses",
            BridgeMethod::StxGetAddresses => "stx_getAddresses",
            BridgeMethod::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for BridgeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetAccountsParams {
    pub purposes: Vec<AddressPurpose>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetAddressesParams {
    pub purposes: Vec<AddressPurpose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GetAddressesResult {
    #[serde(default)]
    pub addresses: Vec<Address>,
}

/// Error object of a JSON-RPC response. Opaque to the controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorPayload {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// `{ result }` or `{ error }`, as returned by providers and remote signers.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponseEnvelope {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequestEnvelope {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: String,
    pub params: serde_json::Value,
}

// ── connect-service HTTP API ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionResponse {
    pub network: BitcoinNetworkType,
    pub btc_addresses: Vec<Address>,
    pub stx_addresses: Vec<Address>,
    pub legacy_addresses: Vec<Address>,
    pub is_connected: bool,
    pub display_addresses: Vec<Address>,
    pub runes_addresses: Vec<Address>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Ok,
    SilentFailure,
    UserFacingFailure,
    Busy,
    Superseded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationResponse {
    pub outcome: OutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub connection: ConnectionResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectNetworkRequest {
    pub network: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_uses_provider_field_names() {
        let raw = r#"{"address":"bc1qxyz","publicKey":"02ab","purpose":"payment","addressType":"p2sh"}"#;
        let address: Address = serde_json::from_str(raw).expect("address should parse");
        assert_eq!(address.purpose, AddressPurpose::Payment);
        assert_eq!(address.public_key.as_deref(), Some("02ab"));
        assert_eq!(address.address_type.as_deref(), Some("p2sh"));
    }

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("testnet".parse::<BitcoinNetworkType>(), Ok(BitcoinNetworkType::Testnet));
        assert_eq!(" Signet ".parse::<BitcoinNetworkType>(), Ok(BitcoinNetworkType::Signet));
        assert!("litecoin".parse::<BitcoinNetworkType>().is_err());
        assert_eq!(BitcoinNetworkType::default(), BitcoinNetworkType::Mainnet);
    }

    #[test]
    fn network_serializes_as_variant_name() {
        let json = serde_json::to_string(&BitcoinNetworkType::Testnet4).expect("serialize");
        assert_eq!(json, "\"Testnet4\"");
    }

    #[test]
    fn method_names_match_provider_api() {
        assert_eq!(BridgeMethod::RequestPermissions.as_str(), "wallet_requestPermissions");
        assert_eq!(BridgeMethod::StxGetAddresses.to_string(), "stx_getAddresses");
    }
}
