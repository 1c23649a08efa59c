use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_severity", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    Info,
    Warning,
    Critical,
}

/// Landing-page notification. Fire-and-forget from the record-creation
/// flows; surfaced until dismissed.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub severity: NotificationSeverity,
    pub action_url: Option<String>,
    pub record_id: Option<Uuid>,
    pub source_app: String,
    pub dismissed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewNotification {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    pub severity: NotificationSeverity,
    pub action_url: Option<String>,
    pub record_id: Option<Uuid>,
}
