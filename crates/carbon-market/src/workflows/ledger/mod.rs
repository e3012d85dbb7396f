//! Ledger boundary: project registration, credit minting, and wallet operations.
//!
//! [`SimulatedLedger`] stands in for the on-chain contracts; documents are pinned through a
//! [`ContentPinner`] before their hash is recorded.

pub mod domain;
pub mod gateway;
pub mod pinning;
pub mod router;
pub mod service;
pub mod simulated;

#[cfg(test)]
mod tests;

pub use domain::{
    token_id_for, Address, CreditMint, CreditToken, ProjectRegistration, TokenBalance,
    TransactionReceipt,
};
pub use gateway::{CreditLedger, LedgerError, WalletGateway};
pub use pinning::{fallback_content_hash, ContentPinner, HttpPinner, PinningError};
pub use router::ledger_router;
pub use service::{LedgerService, LedgerServiceError, MintOutcome, RegistrationOutcome, WalletConnection};
pub use simulated::SimulatedLedger;
