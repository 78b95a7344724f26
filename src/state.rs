use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::fund_raisers::{FundRaiserService, PgFundRaiserService};
use crate::users::{PgUserService, UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserService>,
    pub fund_raisers: Arc<dyn FundRaiserService>,
    /// `None` when no JWT secret is configured; the auth routes are then not mounted.
    pub jwt: Option<JwtKeys>,
}

impl AppState {
    /// Postgres-backed services sharing one pool.
    pub fn new(config: AppConfig, db: Db) -> Self {
        Self::from_parts(
            Arc::new(config),
            Arc::new(PgUserService::new(db.clone())),
            Arc::new(PgFundRaiserService::new(db)),
        )
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserService>,
        fund_raisers: Arc<dyn FundRaiserService>,
    ) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        Self {
            config,
            users,
            fund_raisers,
            jwt,
        }
    }

    pub fn jwt(&self) -> AppResult<&JwtKeys> {
        self.jwt
            .as_ref()
            .ok_or_else(|| AppError::unauthorized("authentication is not configured"))
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::fund_raisers::memory::MemoryFundRaisers;
        use crate::users::memory::MemoryUsers;

        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryUsers::default()),
            Arc::new(MemoryFundRaisers::default()),
        )
    }
}
