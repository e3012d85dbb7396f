//! In-process ledger used for local runs and tests.
//!
//! Balances live in memory and transaction hashes are SHA-256 digests over the chain id,
//! a monotonically increasing nonce, and the call payload, so replays of the same call
//! still produce distinct hashes.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::info;

use super::domain::{Address, CreditMint, ProjectRegistration, TransactionReceipt};
use super::gateway::{CreditLedger, LedgerError, WalletGateway};

const GENESIS_BLOCK: u64 = 1_000_000;

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<Address, f64>,
    registered: HashSet<String>,
    nonce: u64,
}

pub struct SimulatedLedger {
    chain_id: u64,
    operator: Address,
    clock: fn() -> DateTime<Utc>,
    state: Mutex<LedgerState>,
}

impl SimulatedLedger {
    pub fn new(chain_id: u64, operator: Address) -> Self {
        Self::with_clock(chain_id, operator, Utc::now)
    }

    pub fn with_clock(chain_id: u64, operator: Address, clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            chain_id,
            operator,
            clock,
            state: Mutex::new(LedgerState::default()),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Credits an address directly, bypassing minting. Used to seed demo wallets.
    pub fn fund(&self, address: &Address, amount: f64) -> Result<(), LedgerError> {
        ensure_positive(amount)?;
        let mut state = self.lock()?;
        *state.balances.entry(address.clone()).or_default() += amount;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerState>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger state poisoned".to_string()))
    }

    fn receipt(&self, state: &mut LedgerState, kind: &str, payload: &str) -> TransactionReceipt {
        state.nonce += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.chain_id.to_be_bytes());
        hasher.update(state.nonce.to_be_bytes());
        hasher.update(kind.as_bytes());
        hasher.update(payload.as_bytes());

        TransactionReceipt {
            transaction_hash: format!("0x{}", hex::encode(hasher.finalize())),
            block_number: GENESIS_BLOCK + state.nonce,
            timestamp: (self.clock)(),
        }
    }
}

impl CreditLedger for SimulatedLedger {
    fn register_project(
        &self,
        registration: ProjectRegistration,
    ) -> Result<TransactionReceipt, LedgerError> {
        let mut state = self.lock()?;
        let project_id = registration.project_id.as_str().to_string();
        if state.registered.contains(&project_id) {
            return Err(LedgerError::AlreadyRegistered(project_id));
        }

        let payload = format!(
            "{}|{}|{}",
            project_id, registration.ngo_address, registration.ipfs_hash
        );
        let receipt = self.receipt(&mut state, "register", &payload);
        state.registered.insert(project_id);

        info!(
            project_id = %registration.project_id,
            ngo = %registration.ngo_address.short(),
            tx = %receipt.transaction_hash,
            "project registered on ledger"
        );
        Ok(receipt)
    }

    fn mint_credits(&self, mint: CreditMint) -> Result<TransactionReceipt, LedgerError> {
        ensure_positive(mint.credits_amount)?;
        let mut state = self.lock()?;

        let payload = format!(
            "{}|{}|{}|{}",
            mint.project_id, mint.ngo_address, mint.credits_amount, mint.ipfs_hash
        );
        let receipt = self.receipt(&mut state, "mint", &payload);
        *state.balances.entry(mint.ngo_address.clone()).or_default() += mint.credits_amount;

        info!(
            project_id = %mint.project_id,
            credits = mint.credits_amount,
            tx = %receipt.transaction_hash,
            "carbon credits minted"
        );
        Ok(receipt)
    }
}

impl WalletGateway for SimulatedLedger {
    fn connect(&self) -> Result<Address, LedgerError> {
        Ok(self.operator.clone())
    }

    fn balance(&self, address: &Address) -> Result<f64, LedgerError> {
        let state = self.lock()?;
        Ok(state.balances.get(address).copied().unwrap_or_default())
    }

    fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: f64,
    ) -> Result<TransactionReceipt, LedgerError> {
        ensure_positive(amount)?;
        let mut state = self.lock()?;

        let available = state.balances.get(from).copied().unwrap_or_default();
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        let payload = format!("{from}|{to}|{amount}");
        let receipt = self.receipt(&mut state, "transfer", &payload);
        state.balances.insert(from.clone(), available - amount);
        *state.balances.entry(to.clone()).or_default() += amount;

        info!(
            from = %from.short(),
            to = %to.short(),
            amount,
            tx = %receipt.transaction_hash,
            "credits transferred"
        );
        Ok(receipt)
    }
}

fn ensure_positive(amount: f64) -> Result<(), LedgerError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount)
    }
}
