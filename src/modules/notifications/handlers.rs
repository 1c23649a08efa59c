use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{self, AuthUser};
use crate::db::{Notification, NotificationRepository};
use crate::error::{AppError, AppResult};

pub async fn list_active_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Notification>>> {
    auth::current_profile(&state, &user).await?;
    let notifications = NotificationRepository::list_active(&state.db).await?;
    Ok(Json(notifications))
}

pub async fn dismiss_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Notification>> {
    auth::current_profile(&state, &user).await?;
    let notification = NotificationRepository::dismiss(&state.db, id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                AppError::NotFound(format!("Notification {} not found", id))
            }
            other => other.into(),
        })?;
    Ok(Json(notification))
}
