use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use kasa_coordination::{Response, Trigger};
use kasa_reporting::{RankingRow, SummaryRow};
use kasa_types::{ContractType, ContractorRecord, KasaError};

use crate::state::AppState;

type ApiError = (StatusCode, String);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/triggers", post(dispatch_trigger))
        .route(
            "/api/v1/contractors/{user_id}/contracts/{contract}",
            post(register_contract),
        )
        .route("/api/v1/contractors/{user_id}", get(get_contractor))
        .route("/api/v1/reactions", post(react))
        .route("/api/v1/summary", get(get_summary))
        .route("/api/v1/ranking", get(get_ranking))
        .route("/api/v1/export", get(export_csv))
        .route("/api/v1/reset", post(reset))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn api_error(e: KasaError) -> ApiError {
    let status = match &e {
        KasaError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
        KasaError::BonusOverflow { .. } => StatusCode::CONFLICT,
        KasaError::UnknownContractType(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {}", e);
    }
    (status, e.to_string())
}

async fn run(state: &AppState, trigger: Trigger) -> Result<Response, ApiError> {
    state.dispatcher.dispatch(trigger).await.map_err(api_error)
}

fn unexpected(response: Response) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Unexpected response: {response:?}"),
    )
}

async fn dispatch_trigger(
    State(state): State<AppState>,
    Json(trigger): Json<Trigger>,
) -> Result<Json<Response>, ApiError> {
    run(&state, trigger).await.map(Json)
}

async fn register_contract(
    State(state): State<AppState>,
    Path((user_id, contract)): Path<(String, String)>,
) -> Result<Json<Response>, ApiError> {
    let contract: ContractType = contract.parse().map_err(api_error)?;
    run(&state, Trigger::register(user_id, contract))
        .await
        .map(Json)
}

#[derive(serde::Deserialize)]
struct ReactionRequest {
    reactor_id: String,
    marker: String,
}

async fn react(
    State(state): State<AppState>,
    Json(req): Json<ReactionRequest>,
) -> Result<Json<Response>, ApiError> {
    run(&state, Trigger::reaction(req.reactor_id, req.marker))
        .await
        .map(Json)
}

async fn get_contractor(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ContractorRecord>, ApiError> {
    match run(&state, Trigger::ShowMine { caller_id: user_id }).await? {
        Response::Personal { record } => Ok(Json(record)),
        Response::NoRecord { user_id } => Err((
            StatusCode::NOT_FOUND,
            format!("No contracts recorded for {user_id}"),
        )),
        other => Err(unexpected(other)),
    }
}

async fn get_summary(State(state): State<AppState>) -> Result<Json<Vec<SummaryRow>>, ApiError> {
    match run(&state, Trigger::ShowAll).await? {
        Response::Summary { rows } => Ok(Json(rows)),
        Response::EmptyLedger => Ok(Json(Vec::new())),
        other => Err(unexpected(other)),
    }
}

async fn get_ranking(State(state): State<AppState>) -> Result<Json<Vec<RankingRow>>, ApiError> {
    match run(&state, Trigger::ShowTop).await? {
        Response::Ranking { rows } => Ok(Json(rows)),
        other => Err(unexpected(other)),
    }
}

async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    match run(&state, Trigger::Export).await? {
        Response::Export { csv } => Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"kontrakty.csv\"",
                ),
            ],
            csv,
        )),
        other => Err(unexpected(other)),
    }
}

async fn reset(State(state): State<AppState>) -> Result<Json<Response>, ApiError> {
    run(&state, Trigger::Reset).await.map(Json)
}
