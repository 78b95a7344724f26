use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest},
    jwt::AuthUser,
};
use crate::{
    error::{AppError, AppResult, ErrorKind},
    extract::JsonBody,
    response::{data, Data},
    state::AppState,
    users::dto::{check_email, normalize_email, UserOne},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(mut payload): JsonBody<LoginRequest>,
) -> AppResult<Json<Data<AuthResponse>>> {
    payload.email = normalize_email(&payload.email);
    check_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(AppError::bad_request("password is required"));
    }

    let user = state
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;

    let access_token = state.jwt()?.sign(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(data(AuthResponse { access_token, user }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Data<UserOne>>> {
    let user = state.users.find_user_by_id(user_id).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            warn!(user_id, "token subject no longer exists");
            AppError::unauthorized("user not found")
        } else {
            e
        }
    })?;
    Ok(data(UserOne { user }))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState};

    async fn call(app: &Router, req: Request<Body>) -> (u16, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status().as_u16();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn me(token: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri("/api/v1/me");
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        req.body(Body::empty()).unwrap()
    }

    async fn register(app: &Router) {
        let (status, _) = call(
            app,
            post(
                "/api/v1/users",
                json!({ "username": "ada", "email": "ada@example.com", "password": "analytical" }),
            ),
        )
        .await;
        assert_eq!(status, 201);
    }

    #[tokio::test]
    async fn login_then_me() {
        let app = build_app(AppState::fake());
        register(&app).await;

        let (status, body) = call(
            &app,
            post("/api/v1/auth/login", json!({ "email": " ADA@example.com ", "password": "analytical" })),
        )
        .await;
        assert_eq!(status, 200);
        let login = &body["data"];
        assert_eq!(login["user"]["email"], "ada@example.com");
        assert!(login["user"].get("password_hash").is_none());
        let token = login["access_token"].as_str().unwrap().to_string();

        let (status, body) = call(&app, me(Some(&token))).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["user"]["username"], "ada");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = build_app(AppState::fake());
        register(&app).await;

        let (status, body) = call(
            &app,
            post("/api/v1/auth/login", json!({ "email": "ada@example.com", "password": "nope-nope" })),
        )
        .await;
        assert_eq!(status, 401);
        assert_eq!(body, json!({ "error": "invalid credentials" }));

        let (status, _) = call(
            &app,
            post("/api/v1/auth/login", json!({ "email": "bob@example.com", "password": "analytical" })),
        )
        .await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn me_requires_a_valid_token() {
        let app = build_app(AppState::fake());
        let (status, body) = call(&app, me(None)).await;
        assert_eq!(status, 401);
        assert_eq!(body, json!({ "error": "missing Authorization header" }));

        let (status, body) = call(&app, me(Some("not.a.jwt"))).await;
        assert_eq!(status, 401);
        assert_eq!(body, json!({ "error": "invalid or expired token" }));
    }

    #[tokio::test]
    async fn login_requires_fields() {
        let app = build_app(AppState::fake());
        let (status, body) = call(&app, post("/api/v1/auth/login", json!({}))).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({ "error": "email is required" }));
    }
}
