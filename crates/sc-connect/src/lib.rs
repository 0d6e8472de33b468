//! Wallet connection state machine.
//!
//! [`ConnectionController`] walks the provider through the standard,
//! legacy and disconnect sequences and commits results into a
//! [`ConnectionState`] whose slots are persisted through an injected
//! [`sc_storage::KeyValueStore`].

pub mod controller;
pub mod outcome;
pub mod sink;
pub mod state;

pub use controller::{ConnectionController, LEGACY_CONSENT_MESSAGE};
pub use outcome::{Failure, Outcome, Step};
pub use sink::{FailureSink, RecordingSink, TracingSink};
pub use state::{AddressSlot, ConnectionSnapshot, ConnectionState};
