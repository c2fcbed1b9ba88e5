use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod memory;
pub mod password;
pub mod pg;
pub mod service;
pub mod store;
pub mod validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/", post(handlers::create_user).get(handlers::list_users))
        .route("/users/:id", get(handlers::get_user))
}
