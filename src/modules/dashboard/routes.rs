use axum::{routing::get, Router};

use super::handlers::compliance_matrix;
use crate::app_state::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(compliance_matrix))
}
