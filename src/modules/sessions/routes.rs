use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_session, get_session, list_sessions};
use crate::app_state::AppState;

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session))
}
