use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{FundRaiserFilter, FundRaiserList, FundRaiserOne, FundRaiserUpdate, NewFundRaiser};
use crate::{
    error::AppResult,
    extract::{parse_id, FilterParams, JsonBody},
    response::{data, Data},
    state::AppState,
};

const INVALID_FUND_RAISER_ID: &str = "invalid fund raiser id";

pub fn fund_raiser_routes() -> Router<AppState> {
    Router::new()
        .route("/fund-raiser", post(create_fund_raiser).get(find_fund_raisers))
        .route(
            "/fund-raiser/:id",
            get(find_fund_raiser_by_id)
                .put(update_fund_raiser)
                .delete(delete_fund_raiser),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_fund_raiser(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewFundRaiser>,
) -> AppResult<impl IntoResponse> {
    let fr = state.fund_raisers.create_fund_raiser(payload).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/fund-raiser/{}", fr.id))],
    ))
}

#[instrument(skip(state))]
pub async fn find_fund_raisers(
    State(state): State<AppState>,
    FilterParams(filter): FilterParams<FundRaiserFilter>,
) -> AppResult<Json<Data<FundRaiserList>>> {
    let (fundraisers, _) = state.fund_raisers.find_fund_raisers(filter).await?;
    Ok(data(FundRaiserList { fundraisers }))
}

#[instrument(skip(state))]
pub async fn find_fund_raiser_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Data<FundRaiserOne>>> {
    let id = parse_id(&id, INVALID_FUND_RAISER_ID)?;
    let fund_raiser = state.fund_raisers.find_fund_raiser_by_id(id).await?;
    Ok(data(FundRaiserOne { fund_raiser }))
}

#[instrument(skip(state, payload))]
pub async fn update_fund_raiser(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<FundRaiserUpdate>,
) -> AppResult<Json<Data<FundRaiserOne>>> {
    let id = parse_id(&id, INVALID_FUND_RAISER_ID)?;
    let fund_raiser = state.fund_raisers.update_fund_raiser(id, payload).await?;
    Ok(data(FundRaiserOne { fund_raiser }))
}

#[instrument(skip(state))]
pub async fn delete_fund_raiser(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, INVALID_FUND_RAISER_ID)?;
    state.fund_raisers.delete_fund_raiser(id).await?;
    Ok(StatusCode::OK)
}
