use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::User;
pub use services::{PgUserService, UserService};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
