use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod engine;
pub mod filter;
pub mod handlers;
pub mod series;

pub fn router() -> Router<AppState> {
    handlers::dashboard_routes()
}
