use super::domain::{Address, CreditMint, ProjectRegistration, TransactionReceipt};

/// Project registry and credit issuance.
pub trait CreditLedger: Send + Sync {
    fn register_project(
        &self,
        registration: ProjectRegistration,
    ) -> Result<TransactionReceipt, LedgerError>;
    fn mint_credits(&self, mint: CreditMint) -> Result<TransactionReceipt, LedgerError>;
}

/// Wallet-side operations against the credit token.
pub trait WalletGateway: Send + Sync {
    fn connect(&self) -> Result<Address, LedgerError>;
    fn balance(&self, address: &Address) -> Result<f64, LedgerError>;
    fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: f64,
    ) -> Result<TransactionReceipt, LedgerError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid wallet address '{0}'")]
    InvalidAddress(String),
    #[error("amount must be a positive number")]
    InvalidAmount,
    #[error("insufficient balance: {available} available, {requested} requested")]
    InsufficientBalance { available: f64, requested: f64 },
    #[error("project {0} is already registered")]
    AlreadyRegistered(String),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}
