use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_assessment, get_assessment, list_assessments};
use crate::app_state::AppState;

pub fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/assessments", get(list_assessments))
        .route("/assessments", post(create_assessment))
        .route("/assessments/:id", get(get_assessment))
}
