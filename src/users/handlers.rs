use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{NewUser, UserFilter, UserList, UserOne, UserUpdate};
use crate::{
    error::AppResult,
    extract::{parse_id, FilterParams, JsonBody},
    response::{data, Data},
    state::AppState,
};

const INVALID_USER_ID: &str = "invalid user id";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(find_users))
        .route(
            "/users/:id",
            get(find_user_by_id).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewUser>,
) -> AppResult<impl IntoResponse> {
    let user = state.users.create_user(payload).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/users/{}", user.id))],
    ))
}

#[instrument(skip(state))]
pub async fn find_users(
    State(state): State<AppState>,
    FilterParams(filter): FilterParams<UserFilter>,
) -> AppResult<Json<Data<UserList>>> {
    let (users, _) = state.users.find_users(filter).await?;
    Ok(data(UserList { users }))
}

#[instrument(skip(state))]
pub async fn find_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Data<UserOne>>> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    let user = state.users.find_user_by_id(id).await?;
    Ok(data(UserOne { user }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UserUpdate>,
) -> AppResult<Json<Data<UserOne>>> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    let user = state.users.update_user(id, payload).await?;
    Ok(data(UserOne { user }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id, INVALID_USER_ID)?;
    state.users.delete_user(id).await?;
    Ok(StatusCode::OK)
}
