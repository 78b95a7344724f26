pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod fund_raisers;
pub mod ids;
pub mod response;
pub mod state;
#[cfg(test)]
mod testing;
pub mod users;
