use axum::{routing::get, Router};

use super::handlers::{employee_training, get_employee, list_employees};
use crate::app_state::AppState;

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/employees/:id", get(get_employee))
        .route("/employees/:id/training", get(employee_training))
}
