use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod services;
pub mod session;
pub mod validation;

pub fn router(state: &AppState) -> Router<AppState> {
    handlers::auth_routes(&state.auth.pages)
}
