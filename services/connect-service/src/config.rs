use anyhow::Context;
use std::net::SocketAddr;

pub(crate) const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub(crate) const DEFAULT_STORE_PATH: &str = "./data/connection.json";

#[derive(Debug, Clone)]
pub(crate) struct ServiceConfig {
    pub(crate) addr: SocketAddr,
    /// `None` lets the signer transport fall back to its own default.
    pub(crate) signer_url: Option<String>,
    pub(crate) store_path: String,
}

impl ServiceConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_addr = non_empty("CONNECT_SERVICE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_owned());
        let addr = raw_addr
            .parse()
            .with_context(|| format!("invalid CONNECT_SERVICE_ADDR: {raw_addr}"))?;

        Ok(Self {
            addr,
            signer_url: non_empty("SATS_CONNECT_SIGNER_URL"),
            store_path: non_empty("CONNECT_STORE_PATH").unwrap_or_else(|| DEFAULT_STORE_PATH.to_owned()),
        })
    }
}
