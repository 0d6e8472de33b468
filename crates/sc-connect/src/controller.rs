//! Connection controller.
//!
//! Each operation is a strictly ordered chain of provider calls that stops
//! at the first failure. Slots committed by earlier steps stay committed.
//! Only one connect or connect-legacy runs at a time; a trigger that arrives
//! while one is outstanding gets [`Outcome::Busy`]. Disconnect is never
//! turned away: it starts a new session, and a connect still waiting on the
//! wallet from the old session drops its results ([`Outcome::Superseded`]).

use sc_api_types::{
    Address, AddressPurpose, BitcoinNetworkType, GetAccountsParams, GetAddressesParams,
};
use sc_bridge::{BridgeError, WalletBridge};
use sc_storage::KeyValueStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::outcome::{Failure, Outcome, Step};
use crate::sink::FailureSink;
use crate::state::{AddressSlot, ConnectionSnapshot, ConnectionState};

pub const LEGACY_CONSENT_MESSAGE: &str = "Cool app wants to know your addresses!";

pub struct ConnectionController<B> {
    bridge: B,
    state: ConnectionState,
    sink: Arc<dyn FailureSink>,
    in_flight: AtomicBool,
    /// Bumped by every disconnect. Commits are made under this lock and only
    /// when the session they started in is still current.
    session: Mutex<u64>,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B> ConnectionController<B>
where
    B: WalletBridge,
{
    pub fn new(bridge: B, store: Arc<dyn KeyValueStore>, sink: Arc<dyn FailureSink>) -> Self {
        Self {
            bridge,
            state: ConnectionState::restore(store),
            sink,
            in_flight: AtomicBool::new(false),
            session: Mutex::new(0),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.state.snapshot()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Permissions, then payment/ordinals addresses, then Stacks addresses.
    pub async fn connect_standard(&self) -> Outcome {
        let Some(_in_flight) = self.begin("connect_standard") else {
            return Outcome::Busy;
        };
        let session = self.session();

        if let Err(error) = self.bridge.request_permissions().await {
            return self.silent(Step::RequestPermissions, error);
        }

        let btc = match self
            .bridge
            .get_addresses(GetAddressesParams {
                purposes: vec![AddressPurpose::Ordinals, AddressPurpose::Payment],
                message: None,
            })
            .await
        {
            Ok(result) => result.addresses,
            Err(error) => return self.silent(Step::BitcoinAddresses, error),
        };
        if !self.commit(session, AddressSlot::Btc, btc) {
            return Outcome::Superseded;
        }

        match self.bridge.stx_get_addresses().await {
            Ok(result) => {
                if !self.commit(session, AddressSlot::Stx, result.addresses) {
                    return Outcome::Superseded;
                }
            }
            // Only a tagged refusal is shown to the user; a broken call stays in the log.
            Err(error) if error.is_rejection() => {
                return self.user_facing(Step::StacksAddresses, error);
            }
            Err(error) => return self.silent(Step::StacksAddresses, error),
        }

        info!("wallet connected");
        Outcome::Ok
    }

    /// One combined request for every purpose, committed in a single write.
    pub async fn connect_legacy(&self) -> Outcome {
        let Some(_in_flight) = self.begin("connect_legacy") else {
            return Outcome::Busy;
        };
        let session = self.session();

        let params = GetAccountsParams {
            purposes: vec![
                AddressPurpose::Payment,
                AddressPurpose::Ordinals,
                AddressPurpose::Stacks,
            ],
            message: LEGACY_CONSENT_MESSAGE.to_owned(),
        };

        match self.bridge.get_accounts(params).await {
            Ok(addresses) => {
                if !self.commit(session, AddressSlot::Legacy, addresses) {
                    return Outcome::Superseded;
                }
                info!("wallet connected (legacy)");
                Outcome::Ok
            }
            Err(error) => self.silent(Step::LegacyAccounts, error),
        }
    }

    /// Tear down the provider session and clear every address slot, even
    /// when the teardown call fails or a connect is still outstanding.
    pub async fn disconnect(&self) -> Outcome {
        {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            *session += 1;
            debug!("disconnect started, session {}", *session);
        }

        if let Err(error) = self.bridge.disconnect().await {
            warn!("wallet disconnect failed, clearing local state anyway: {}", error);
        }

        {
            let _session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            self.state.clear_addresses();
        }

        info!("wallet disconnected");
        Outcome::Ok
    }

    pub fn select_network(&self, network: BitcoinNetworkType) {
        info!("network set to {}", network);
        self.state.set_network(network);
    }

    fn begin(&self, operation: &str) -> Option<InFlight<'_>> {
        match self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                debug!("{} started", operation);
                Some(InFlight(&self.in_flight))
            }
            Err(_) => {
                debug!("{} ignored: another wallet operation is in flight", operation);
                None
            }
        }
    }

    fn session(&self) -> u64 {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Commit `addresses` unless a disconnect has started since `session`.
    fn commit(&self, session: u64, slot: AddressSlot, addresses: Vec<Address>) -> bool {
        let current = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != session {
            info!("dropping {} result: wallet was disconnected meanwhile", slot.key());
            return false;
        }
        self.state.commit(slot, addresses);
        true
    }

    fn silent(&self, step: Step, error: BridgeError) -> Outcome {
        let failure = Failure { step, error };
        self.sink.log(&failure);
        Outcome::SilentFailure(failure)
    }

    fn user_facing(&self, step: Step, error: BridgeError) -> Outcome {
        let failure = Failure { step, error };
        self.sink.alert(&failure);
        self.sink.log(&failure);
        Outcome::UserFacingFailure(failure)
    }
}
