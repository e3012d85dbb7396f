use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::projects::ProjectId;

use super::gateway::LedgerError;

pub const ADDRESS_LENGTH: usize = 42;

/// Account address on the credit ledger (`0x` followed by 40 hex digits).
///
/// Equality and hashing use the lowercase form, so checksummed and lowercase spellings of
/// one account are the same key. The spelling the caller supplied is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    display: String,
    canonical: String,
}

impl Address {
    pub fn parse(value: &str) -> Result<Self, LedgerError> {
        let trimmed = value.trim();
        let well_formed = trimmed.len() == ADDRESS_LENGTH
            && trimmed
                .strip_prefix("0x")
                .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()));
        if well_formed {
            Ok(Self {
                display: trimmed.to_string(),
                canonical: trimmed.to_ascii_lowercase(),
            })
        } else {
            Err(LedgerError::InvalidAddress(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Lowercase form used as the account key.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Shortened `0x1234...abcd` form used in logs and wallet banners.
    pub fn short(&self) -> String {
        format!(
            "{}...{}",
            &self.display[..6],
            &self.display[ADDRESS_LENGTH - 4..]
        )
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl TryFrom<String> for Address {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.display
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Token metadata quoted alongside wallet balances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditToken {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    pub contract_address: Address,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
}

impl CreditToken {
    pub fn carbon_credit(contract_address: Address, price_usd: f64) -> Self {
        Self {
            symbol: "CCT",
            name: "Carbon Credit Token",
            decimals: 18,
            contract_address,
            price_usd,
        }
    }

    pub fn balance_of(&self, balance: f64) -> TokenBalance {
        TokenBalance {
            symbol: self.symbol,
            name: self.name,
            balance,
            decimals: self.decimals,
            contract_address: self.contract_address.clone(),
            price_usd: self.price_usd,
            value: balance * self.price_usd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub symbol: &'static str,
    pub name: &'static str,
    pub balance: f64,
    pub decimals: u8,
    pub contract_address: Address,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
    pub value: f64,
}

/// Result of a state-changing ledger call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
}

/// On-chain registration of a submitted project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRegistration {
    pub project_id: ProjectId,
    pub ngo_address: Address,
    pub latitude: f64,
    pub longitude: f64,
    pub area_hectares: f64,
    pub project_type: String,
    pub ipfs_hash: String,
}

/// Issuance of credits for a verified project.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditMint {
    pub project_id: ProjectId,
    pub ngo_address: Address,
    pub credits_amount: f64,
    pub ipfs_hash: String,
}

/// Token id minted for a project: `CCT-` plus the sequence segment of the project id.
pub fn token_id_for(project_id: &ProjectId) -> String {
    match project_id.as_str().split('-').nth(2) {
        Some(sequence) if !sequence.is_empty() => format!("CCT-{sequence}"),
        _ => format!("CCT-{}", project_id.as_str()),
    }
}
