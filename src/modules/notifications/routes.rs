use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{dismiss_notification, list_active_notifications};
use crate::app_state::AppState;

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_active_notifications))
        .route("/notifications/:id/dismiss", post(dismiss_notification))
}
