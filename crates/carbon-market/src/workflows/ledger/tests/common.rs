use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::ledger::domain::{
    Address, CreditMint, CreditToken, ProjectRegistration, TransactionReceipt,
};
use crate::workflows::ledger::gateway::{CreditLedger, LedgerError, WalletGateway};
use crate::workflows::ledger::pinning::{ContentPinner, HttpPinner, PinningError};
use crate::workflows::ledger::{ledger_router, LedgerService, SimulatedLedger};

pub(super) const NGO: &str = "0x742d35Cc6634C0532925a3b8D4C0532925a3b8D4";
pub(super) const BUYER: &str = "0x9876543210fedcba0987654321fedcba09876543";
pub(super) const CONTRACT: &str = "0xf84473cbC4dB118348d1d07414Cd98987750428e";

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 2, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn address(raw: &str) -> Address {
    Address::parse(raw).expect("valid address")
}

pub(super) fn token() -> CreditToken {
    CreditToken::carbon_credit(address(CONTRACT), 25.5)
}

pub(super) fn simulated_service() -> (
    Arc<LedgerService<SimulatedLedger, HttpPinner>>,
    Arc<SimulatedLedger>,
) {
    let ledger = Arc::new(SimulatedLedger::with_clock(80002, address(NGO), fixed_now));
    let service = LedgerService::with_clock(
        ledger.clone(),
        Arc::new(HttpPinner::offline()),
        token(),
        80002,
        fixed_now,
    );
    (Arc::new(service), ledger)
}

pub(super) fn router_with_simulated_ledger() -> (axum::Router, Arc<SimulatedLedger>) {
    let (service, ledger) = simulated_service();
    (ledger_router(service), ledger)
}

/// Ledger whose node connection is down.
pub(super) struct OfflineLedger;

impl CreditLedger for OfflineLedger {
    fn register_project(
        &self,
        _registration: ProjectRegistration,
    ) -> Result<TransactionReceipt, LedgerError> {
        Err(LedgerError::Unavailable("rpc timeout".to_string()))
    }

    fn mint_credits(&self, _mint: CreditMint) -> Result<TransactionReceipt, LedgerError> {
        Err(LedgerError::Unavailable("rpc timeout".to_string()))
    }
}

impl WalletGateway for OfflineLedger {
    fn connect(&self) -> Result<Address, LedgerError> {
        Err(LedgerError::Unavailable("rpc timeout".to_string()))
    }

    fn balance(&self, _address: &Address) -> Result<f64, LedgerError> {
        Err(LedgerError::Unavailable("rpc timeout".to_string()))
    }

    fn transfer(
        &self,
        _from: &Address,
        _to: &Address,
        _amount: f64,
    ) -> Result<TransactionReceipt, LedgerError> {
        Err(LedgerError::Unavailable("rpc timeout".to_string()))
    }
}

/// Pinner that reports a hard failure instead of falling back.
pub(super) struct RejectingPinner;

#[async_trait::async_trait]
impl ContentPinner for RejectingPinner {
    async fn pin_json(&self, _document: &Value) -> Result<String, PinningError> {
        Err(PinningError::MissingHash)
    }
}

pub(super) fn offline_router() -> axum::Router {
    let service = LedgerService::with_clock(
        Arc::new(OfflineLedger),
        Arc::new(HttpPinner::offline()),
        token(),
        80002,
        fixed_now,
    );
    ledger_router(Arc::new(service))
}

pub(super) fn rejecting_pinner_router() -> axum::Router {
    let service = LedgerService::with_clock(
        Arc::new(SimulatedLedger::with_clock(80002, address(NGO), fixed_now)),
        Arc::new(RejectingPinner),
        token(),
        80002,
        fixed_now,
    );
    ledger_router(Arc::new(service))
}

pub(super) fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request")
}

pub(super) fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request")
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
