//! Persisted connection state.
//!
//! Four independently persisted fields. "Connected" is derived from the
//! address slots and never stored.

use sc_api_types::{Address, BitcoinNetworkType, ConnectionResponse};
use sc_storage::{KeyValueStore, Persisted};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

pub const NETWORK_KEY: &str = "network";
pub const BTC_ADDRESSES_KEY: &str = "btc-addresses";
pub const STX_ADDRESSES_KEY: &str = "stx-addresses";
pub const LEGACY_ADDRESSES_KEY: &str = "legacy-addresses";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSlot {
    Btc,
    Stx,
    Legacy,
}

impl AddressSlot {
    pub fn key(&self) -> &'static str {
        match self {
            AddressSlot::Btc => BTC_ADDRESSES_KEY,
            AddressSlot::Stx => STX_ADDRESSES_KEY,
            AddressSlot::Legacy => LEGACY_ADDRESSES_KEY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionSnapshot {
    pub network: BitcoinNetworkType,
    pub btc_addresses: Vec<Address>,
    pub stx_addresses: Vec<Address>,
    pub legacy_addresses: Vec<Address>,
}

impl ConnectionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.btc_addresses.len() + self.stx_addresses.len() + self.legacy_addresses.len() > 0
    }

    /// Addresses shown in the address panel.
    pub fn display_addresses(&self) -> Vec<Address> {
        self.btc_addresses
            .iter()
            .chain(&self.stx_addresses)
            .cloned()
            .collect()
    }

    /// Addresses offered to the rune mint / etch widgets.
    pub fn runes_addresses(&self) -> Vec<Address> {
        self.btc_addresses
            .iter()
            .chain(&self.legacy_addresses)
            .cloned()
            .collect()
    }

    pub fn slot(&self, slot: AddressSlot) -> &[Address] {
        match slot {
            AddressSlot::Btc => &self.btc_addresses,
            AddressSlot::Stx => &self.stx_addresses,
            AddressSlot::Legacy => &self.legacy_addresses,
        }
    }

    pub fn to_response(&self) -> ConnectionResponse {
        ConnectionResponse {
            network: self.network,
            btc_addresses: self.btc_addresses.clone(),
            stx_addresses: self.stx_addresses.clone(),
            legacy_addresses: self.legacy_addresses.clone(),
            is_connected: self.is_connected(),
            display_addresses: self.display_addresses(),
            runes_addresses: self.runes_addresses(),
        }
    }
}

pub struct ConnectionState {
    network: Persisted<BitcoinNetworkType>,
    btc_addresses: Persisted<Vec<Address>>,
    stx_addresses: Persisted<Vec<Address>>,
    legacy_addresses: Persisted<Vec<Address>>,
    changes: watch::Sender<ConnectionSnapshot>,
}

impl ConnectionState {
    /// Load every field from `store`, defaulting the ones that are missing
    /// or unreadable.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let network = Persisted::load(store.clone(), NETWORK_KEY, BitcoinNetworkType::default());
        let btc_addresses = Persisted::load(store.clone(), BTC_ADDRESSES_KEY, Vec::new());
        let stx_addresses = Persisted::load(store.clone(), STX_ADDRESSES_KEY, Vec::new());
        let legacy_addresses = Persisted::load(store, LEGACY_ADDRESSES_KEY, Vec::new());

        let (changes, _) = watch::channel(ConnectionSnapshot {
            network: network.get(),
            btc_addresses: btc_addresses.get(),
            stx_addresses: stx_addresses.get(),
            legacy_addresses: legacy_addresses.get(),
        });

        Self {
            network,
            btc_addresses,
            stx_addresses,
            legacy_addresses,
            changes,
        }
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            network: self.network.get(),
            btc_addresses: self.btc_addresses.get(),
            stx_addresses: self.stx_addresses.get(),
            legacy_addresses: self.legacy_addresses.get(),
        }
    }

    pub fn is_connected(&self) -> bool {
        [AddressSlot::Btc, AddressSlot::Stx, AddressSlot::Legacy]
            .into_iter()
            .map(|slot| self.persisted(slot).with(Vec::len))
            .sum::<usize>()
            > 0
    }

    pub fn network(&self) -> BitcoinNetworkType {
        self.network.get()
    }

    pub fn addresses(&self, slot: AddressSlot) -> Vec<Address> {
        self.persisted(slot).get()
    }

    /// Receiver that yields a fresh snapshot after every committed change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionSnapshot> {
        self.changes.subscribe()
    }

    pub(crate) fn commit(&self, slot: AddressSlot, addresses: Vec<Address>) {
        info!("committing {} address(es) to {}", addresses.len(), slot.key());
        self.persisted(slot).set(addresses);
        self.publish();
    }

    pub(crate) fn clear_addresses(&self) {
        for slot in [AddressSlot::Btc, AddressSlot::Stx, AddressSlot::Legacy] {
            self.persisted(slot).set(Vec::new());
        }
        self.publish();
    }

    pub(crate) fn set_network(&self, network: BitcoinNetworkType) {
        self.network.set(network);
        self.publish();
    }

    fn persisted(&self, slot: AddressSlot) -> &Persisted<Vec<Address>> {
        match slot {
            AddressSlot::Btc => &self.btc_addresses,
            AddressSlot::Stx => &self.stx_addresses,
            AddressSlot::Legacy => &self.legacy_addresses,
        }
    }

    fn publish(&self) {
        self.changes.send_replace(self.snapshot());
    }
}
