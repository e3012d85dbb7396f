use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::workflows::projects::ProjectId;

use super::domain::{
    token_id_for, Address, CreditMint, CreditToken, ProjectRegistration, TokenBalance,
    TransactionReceipt,
};
use super::gateway::{CreditLedger, LedgerError, WalletGateway};
use super::pinning::{ContentPinner, PinningError};

/// Coordinates registration, minting, and wallet calls against a ledger and a pinner.
pub struct LedgerService<L, P> {
    ledger: Arc<L>,
    pinner: Arc<P>,
    token: CreditToken,
    chain_id: u64,
    clock: fn() -> DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub project_id: ProjectId,
    pub transaction_hash: String,
    pub ipfs_hash: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintOutcome {
    pub token_id: String,
    pub transaction_hash: String,
    pub ipfs_hash: String,
    pub credits_amount: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnection {
    pub address: Address,
    pub chain_id: u64,
    pub is_connected: bool,
}

impl<L, P> LedgerService<L, P>
where
    L: CreditLedger + WalletGateway + 'static,
    P: ContentPinner + 'static,
{
    pub fn new(ledger: Arc<L>, pinner: Arc<P>, token: CreditToken, chain_id: u64) -> Self {
        Self::with_clock(ledger, pinner, token, chain_id, Utc::now)
    }

    pub fn with_clock(
        ledger: Arc<L>,
        pinner: Arc<P>,
        token: CreditToken,
        chain_id: u64,
        clock: fn() -> DateTime<Utc>,
    ) -> Self {
        Self {
            ledger,
            pinner,
            token,
            chain_id,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Pins the submitted project document and records it on the ledger under a new id.
    pub async fn register(
        &self,
        project_data: &Value,
        ngo_address: Address,
    ) -> Result<RegistrationOutcome, LedgerServiceError> {
        let submitted_at = self.now();
        let project_id = ProjectId::generate(submitted_at);

        let mut document = project_data.clone();
        if let Value::Object(fields) = &mut document {
            fields.insert("projectId".to_string(), json!(project_id));
            fields.insert("submissionDate".to_string(), json!(submitted_at));
        }
        let ipfs_hash = self.pinner.pin_json(&document).await?;

        let receipt = self.ledger.register_project(ProjectRegistration {
            project_id: project_id.clone(),
            ngo_address,
            latitude: numeric_field(project_data, "/coordinates/lat"),
            longitude: numeric_field(project_data, "/coordinates/lng"),
            area_hectares: numeric_field(project_data, "/area"),
            project_type: project_data
                .pointer("/type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            ipfs_hash: ipfs_hash.clone(),
        })?;

        Ok(RegistrationOutcome {
            project_id,
            transaction_hash: receipt.transaction_hash,
            ipfs_hash,
            timestamp: self.now(),
        })
    }

    /// Pins the verification evidence and mints credits to the NGO wallet.
    pub async fn mint(
        &self,
        project_id: ProjectId,
        ngo_address: Address,
        credits_amount: f64,
        verification_data: &Value,
    ) -> Result<MintOutcome, LedgerServiceError> {
        let evidence = json!({
            "projectId": project_id,
            "verificationData": verification_data,
            "timestamp": self.now(),
        });
        let ipfs_hash = self.pinner.pin_json(&evidence).await?;

        let receipt = self.ledger.mint_credits(CreditMint {
            project_id: project_id.clone(),
            ngo_address,
            credits_amount,
            ipfs_hash: ipfs_hash.clone(),
        })?;

        Ok(MintOutcome {
            token_id: token_id_for(&project_id),
            transaction_hash: receipt.transaction_hash,
            ipfs_hash,
            credits_amount,
            timestamp: self.now(),
        })
    }

    pub fn connect(&self) -> Result<WalletConnection, LedgerError> {
        let address = self.ledger.connect()?;
        info!(address = %address.short(), chain_id = self.chain_id, "wallet connected");
        Ok(WalletConnection {
            address,
            chain_id: self.chain_id,
            is_connected: true,
        })
    }

    pub fn balances(&self, address: &Address) -> Result<Vec<TokenBalance>, LedgerError> {
        let balance = self.ledger.balance(address)?;
        Ok(vec![self.token.balance_of(balance)])
    }

    pub fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: f64,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.ledger.transfer(from, to, amount)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Pinning(#[from] PinningError),
}

/// Reads a number that clients may send either as JSON number or numeric string.
fn numeric_field(document: &Value, pointer: &str) -> f64 {
    match document.pointer(pointer) {
        Some(Value::Number(number)) => number.as_f64().unwrap_or_default(),
        Some(Value::String(raw)) => raw.trim().parse().unwrap_or_default(),
        _ => 0.0,
    }
}
