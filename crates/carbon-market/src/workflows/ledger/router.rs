use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::workflows::projects::ProjectId;

use super::domain::Address;
use super::gateway::{CreditLedger, LedgerError, WalletGateway};
use super::pinning::ContentPinner;
use super::service::{LedgerService, LedgerServiceError};

const MISSING_FIELDS: &str = "Missing required fields";
const MALFORMED_BODY: &str = "Invalid request body";
const ADDRESS_REQUIRED: &str = "Wallet address is required";
const INVALID_ADDRESS: &str = "Invalid wallet address format";
const REGISTER_FAILED: &str = "Failed to register project";
const MINT_FAILED: &str = "Failed to mint carbon credits";
const BALANCE_FAILED: &str = "Failed to fetch wallet balance";
const TRANSFER_FAILED: &str = "Failed to transfer tokens";
const CONNECT_FAILED: &str = "Failed to connect wallet";

/// Router builder exposing ledger registration, minting, and wallet endpoints.
pub fn ledger_router<L, P>(service: Arc<LedgerService<L, P>>) -> Router
where
    L: CreditLedger + WalletGateway + 'static,
    P: ContentPinner + 'static,
{
    Router::new()
        .route("/api/blockchain/register", post(register_handler::<L, P>))
        .route("/api/blockchain/mint", post(mint_handler::<L, P>))
        .route("/api/wallet/connect", post(connect_handler::<L, P>))
        .route("/api/wallet/balance", get(balance_handler::<L, P>))
        .route("/api/wallet/transfer", post(transfer_handler::<L, P>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    #[serde(default)]
    pub(crate) project_data: Option<Value>,
    #[serde(default)]
    pub(crate) ngo_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MintRequest {
    #[serde(default)]
    pub(crate) project_id: Option<String>,
    #[serde(default)]
    pub(crate) ngo_address: Option<String>,
    #[serde(default)]
    pub(crate) credits_amount: Option<f64>,
    #[serde(default)]
    pub(crate) verification_data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BalanceParams {
    #[serde(default)]
    pub(crate) address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransferRequest {
    #[serde(default)]
    pub(crate) from: Option<String>,
    #[serde(default)]
    pub(crate) to: Option<String>,
    #[serde(default)]
    pub(crate) amount: Option<f64>,
}

pub(crate) async fn register_handler<L, P>(
    State(service): State<Arc<LedgerService<L, P>>>,
    body: Result<axum::Json<RegisterRequest>, JsonRejection>,
) -> Response
where
    L: CreditLedger + WalletGateway + 'static,
    P: ContentPinner + 'static,
{
    let request = match read_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let (Some(project_data), Some(ngo_address)) = (
        request.project_data.filter(is_present),
        non_blank(request.ngo_address),
    ) else {
        return client_error(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };
    let Ok(ngo_address) = Address::parse(&ngo_address) else {
        return client_error(StatusCode::BAD_REQUEST, INVALID_ADDRESS);
    };

    match service.register(&project_data, ngo_address).await {
        Ok(outcome) => success(outcome),
        Err(err) => service_error_response(err, REGISTER_FAILED),
    }
}

pub(crate) async fn mint_handler<L, P>(
    State(service): State<Arc<LedgerService<L, P>>>,
    body: Result<axum::Json<MintRequest>, JsonRejection>,
) -> Response
where
    L: CreditLedger + WalletGateway + 'static,
    P: ContentPinner + 'static,
{
    let request = match read_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let (Some(project_id), Some(ngo_address), Some(credits_amount), Some(verification_data)) = (
        non_blank(request.project_id),
        non_blank(request.ngo_address),
        request.credits_amount.filter(|amount| *amount != 0.0),
        request.verification_data.filter(is_present),
    ) else {
        return client_error(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };
    let Ok(ngo_address) = Address::parse(&ngo_address) else {
        return client_error(StatusCode::BAD_REQUEST, INVALID_ADDRESS);
    };

    match service
        .mint(
            ProjectId(project_id),
            ngo_address,
            credits_amount,
            &verification_data,
        )
        .await
    {
        Ok(outcome) => success(outcome),
        Err(err) => service_error_response(err, MINT_FAILED),
    }
}

pub(crate) async fn connect_handler<L, P>(
    State(service): State<Arc<LedgerService<L, P>>>,
) -> Response
where
    L: CreditLedger + WalletGateway + 'static,
    P: ContentPinner + 'static,
{
    match service.connect() {
        Ok(connection) => success(connection),
        Err(err) => ledger_error_response(err, CONNECT_FAILED),
    }
}

pub(crate) async fn balance_handler<L, P>(
    State(service): State<Arc<LedgerService<L, P>>>,
    Query(params): Query<BalanceParams>,
) -> Response
where
    L: CreditLedger + WalletGateway + 'static,
    P: ContentPinner + 'static,
{
    let Some(raw) = non_blank(params.address) else {
        return client_error(StatusCode::BAD_REQUEST, ADDRESS_REQUIRED);
    };
    let Ok(address) = Address::parse(&raw) else {
        return client_error(StatusCode::BAD_REQUEST, INVALID_ADDRESS);
    };

    match service.balances(&address) {
        Ok(balances) => success(json!({
            "address": address,
            "balances": balances,
            "timestamp": service.now(),
        })),
        Err(err) => ledger_error_response(err, BALANCE_FAILED),
    }
}

pub(crate) async fn transfer_handler<L, P>(
    State(service): State<Arc<LedgerService<L, P>>>,
    body: Result<axum::Json<TransferRequest>, JsonRejection>,
) -> Response
where
    L: CreditLedger + WalletGateway + 'static,
    P: ContentPinner + 'static,
{
    let request = match read_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let (Some(from), Some(to), Some(amount)) = (
        non_blank(request.from),
        non_blank(request.to),
        request.amount,
    ) else {
        return client_error(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };
    let (Ok(from), Ok(to)) = (Address::parse(&from), Address::parse(&to)) else {
        return client_error(StatusCode::BAD_REQUEST, INVALID_ADDRESS);
    };

    match service.transfer(&from, &to, amount) {
        Ok(receipt) => success(json!({
            "from": from,
            "to": to,
            "amount": amount,
            "transactionHash": receipt.transaction_hash,
            "blockNumber": receipt.block_number,
            "timestamp": receipt.timestamp,
        })),
        Err(err) => ledger_error_response(err, TRANSFER_FAILED),
    }
}

fn read_body<T>(body: Result<axum::Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|axum::Json(request)| request).map_err(|rejection| {
        warn!(error = %rejection.body_text(), "ledger request body rejected");
        client_error(StatusCode::BAD_REQUEST, MALFORMED_BODY)
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn is_present(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, axum::Json(json!({ "success": true, "data": data }))).into_response()
}

fn client_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn service_error_response(err: LedgerServiceError, failure: &str) -> Response {
    match err {
        LedgerServiceError::Ledger(err) => ledger_error_response(err, failure),
        LedgerServiceError::Pinning(err) => {
            error!(error = %err, "content pinning failure");
            client_error(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}

fn ledger_error_response(err: LedgerError, failure: &str) -> Response {
    match &err {
        LedgerError::InvalidAddress(_) => client_error(StatusCode::BAD_REQUEST, INVALID_ADDRESS),
        LedgerError::InvalidAmount => client_error(StatusCode::BAD_REQUEST, &err.to_string()),
        LedgerError::InsufficientBalance { .. } => {
            client_error(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string())
        }
        LedgerError::AlreadyRegistered(_) => client_error(StatusCode::CONFLICT, &err.to_string()),
        LedgerError::Unavailable(_) => {
            error!(error = %err, "ledger failure");
            client_error(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}
