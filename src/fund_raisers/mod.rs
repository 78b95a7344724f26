use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::FundRaiser;
pub use services::{FundRaiserService, PgFundRaiserService};

pub fn router() -> Router<AppState> {
    handlers::fund_raiser_routes()
}
