//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ops_escrow::{Address, Amount, Command, ErrorKind, TokenId};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::errors::ServiceError;
use crate::events::EventRecord;
use crate::registry::RegistryState;

pub struct ApiState {
    pub registry: RegistryState,
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CommandRequest {
    pub caller: Address,
    pub command: Command,
}

#[derive(Deserialize)]
pub struct RoyaltyQuery {
    pub amount: String,
}

#[derive(Serialize)]
pub struct RoyaltyResponse {
    pub token_id: TokenId,
    pub receiver: Address,
    pub royalty_amount: Amount,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub project_id: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct TokenIdsResponse {
    pub address: Address,
    pub token_ids: Vec<TokenId>,
}

#[derive(Serialize)]
pub struct OpenCountResponse {
    pub address: Address,
    pub open_count: u64,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub balance: Amount,
}

#[derive(Serialize)]
pub struct TokenCountResponse {
    pub address: Address,
    pub token_count: u64,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub initialized: bool,
    pub total_supply: u64,
    pub total_escrowed: Amount,
    pub total_paid_out: Amount,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Registry(e) => match e.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::TerminalState => StatusCode::CONFLICT,
            ErrorKind::Payment => StatusCode::UNPROCESSABLE_ENTITY,
        },
        ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ServiceError) -> Response {
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn ok<T: Serialize>(body: T) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /commands`
///
/// Applies one command on behalf of `caller` and returns its receipt.
pub async fn post_command(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CommandRequest>,
) -> impl IntoResponse {
    match state
        .registry
        .execute(&request.caller, request.command)
        .await
    {
        Ok(receipt) => ok(receipt),
        Err(e) => error_response(e),
    }
}

/// `GET /projects/:id`
pub async fn get_project(
    State(state): State<Arc<ApiState>>,
    Path(token_id): Path<TokenId>,
) -> impl IntoResponse {
    match state.registry.read(|r| r.token_details(token_id)).await {
        Ok(project) => ok(project),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /projects/:id/royalty?amount=N`
///
/// Previews the royalty owed on `amount`.
pub async fn get_royalty(
    State(state): State<Arc<ApiState>>,
    Path(token_id): Path<TokenId>,
    Query(query): Query<RoyaltyQuery>,
) -> impl IntoResponse {
    let amount: Amount = match query.amount.parse() {
        Ok(amount) => amount,
        Err(_) => {
            return error_response(ServiceError::BadRequest(format!(
                "invalid amount: {}",
                query.amount
            )))
        }
    };
    match state
        .registry
        .read(|r| r.royalty_info(token_id, amount))
        .await
    {
        Ok((receiver, royalty_amount)) => ok(RoyaltyResponse {
            token_id,
            receiver,
            royalty_amount,
        }),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /projects/:id/submissions`
pub async fn get_project_submissions(
    State(state): State<Arc<ApiState>>,
    Path(token_id): Path<TokenId>,
) -> impl IntoResponse {
    match state
        .registry
        .read(|r| r.get_submissions_for_token_id(token_id))
        .await
    {
        Ok(submissions) => ok(submissions),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /projects/:id/events`
///
/// Returns all logged events for the given project identifier.
pub async fn get_project_events(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> impl IntoResponse {
    match db::get_events_for_project(&state.registry.pool, &project_id).await {
        Ok(events) => {
            let count = events.len();
            ok(EventsResponse {
                project_id,
                count,
                events,
            })
        }
        Err(e) => error_response(e),
    }
}

/// `GET /creators/:address/projects`
pub async fn get_creator_projects(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    let address = Address::new(address);
    let token_ids = state
        .registry
        .read(|r| r.get_array_of_nfts_from_creator(&address))
        .await;
    ok(TokenIdsResponse { address, token_ids })
}

/// `GET /creators/:address/open-count`
pub async fn get_creator_open_count(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    let address = Address::new(address);
    let open_count = state
        .registry
        .read(|r| r.get_number_of_open_nfts_from_creator(&address))
        .await;
    ok(OpenCountResponse {
        address,
        open_count,
    })
}

/// `GET /submitters/:address/projects`
///
/// One entry per submission, so a project appears once for each submission.
pub async fn get_submitter_projects(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    let address = Address::new(address);
    let token_ids = state
        .registry
        .read(|r| r.get_token_ids_with_submissions_from_address(&address))
        .await;
    ok(TokenIdsResponse { address, token_ids })
}

/// `GET /submitters/:address/projects/:id/submissions`
pub async fn get_submitter_submissions(
    State(state): State<Arc<ApiState>>,
    Path((address, token_id)): Path<(String, TokenId)>,
) -> impl IntoResponse {
    let address = Address::new(address);
    let submissions = state
        .registry
        .read(|r| r.get_submissions_from_address_for_token_id(&address, token_id))
        .await;
    ok(submissions)
}

/// `GET /accounts/:address/balance`
pub async fn get_account_balance(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    let address = Address::new(address);
    let balance = state.registry.read(|r| r.account_balance(&address)).await;
    ok(BalanceResponse { address, balance })
}

/// `GET /accounts/:address/tokens`
pub async fn get_account_tokens(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    let address = Address::new(address);
    match state.registry.read(|r| r.balance_of(&address)).await {
        Ok(token_count) => ok(TokenCountResponse {
            address,
            token_count,
        }),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /stats`
pub async fn get_stats(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let stats = state
        .registry
        .read(|r| StatsResponse {
            initialized: r.initialized(),
            total_supply: r.total_supply(),
            total_escrowed: r.get_total_bounty_amount(),
            total_paid_out: r.get_total_eth_paid_out(),
        })
        .await;
    ok(stats)
}

/// `GET /events`
///
/// Returns all logged events across all projects.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    match db::get_all_events(&state.registry.pool).await {
        Ok(events) => {
            let count = events.len();
            ok(AllEventsResponse { count, events })
        }
        Err(e) => error_response(e),
    }
}
