use sc_api_types::OutcomeKind;
use sc_bridge::BridgeError;
use std::fmt;

/// Provider steps that can stop an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    RequestPermissions,
    BitcoinAddresses,
    StacksAddresses,
    LegacyAccounts,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::RequestPermissions => "request_permissions",
            Step::BitcoinAddresses => "bitcoin_addresses",
            Step::StacksAddresses => "stacks_addresses",
            Step::LegacyAccounts => "legacy_accounts",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Step::RequestPermissions => "Error connecting to wallet, details in terminal.",
            Step::BitcoinAddresses => {
                "Error retrieving bitcoin addresses after having requested permissions."
            }
            Step::StacksAddresses => {
                "Error retrieving stacks addresses after having requested permissions. Details in terminal."
            }
            Step::LegacyAccounts => "Error retrieving wallet accounts.",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub step: Step,
    pub error: BridgeError,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.step.message(), self.error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ok,
    /// Reported to the developer log only.
    SilentFailure(Failure),
    /// Reported to the user as well as the log.
    UserFacingFailure(Failure),
    /// Another operation was still running; nothing was done.
    Busy,
    /// A disconnect cleared the session while this operation was waiting on
    /// the wallet; its results were dropped.
    Superseded,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::SilentFailure(failure) | Outcome::UserFacingFailure(failure) => Some(failure),
            Outcome::Ok | Outcome::Busy | Outcome::Superseded => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Ok => OutcomeKind::Ok,
            Outcome::SilentFailure(_) => OutcomeKind::SilentFailure,
            Outcome::UserFacingFailure(_) => OutcomeKind::UserFacingFailure,
            Outcome::Busy => OutcomeKind::Busy,
            Outcome::Superseded => OutcomeKind::Superseded,
        }
    }
}
