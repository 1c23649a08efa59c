use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Manager,
    Staff,
    Other,
}

/// Profile row for an authenticated user, keyed by the identity provider's
/// user id. Owned by the identity system; read-only here.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub role: UserRole,
}

impl UserProfile {
    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }

    /// Staff and managers may log sessions and assessments.
    pub fn can_record_training(&self) -> bool {
        matches!(self.role, UserRole::Manager | UserRole::Staff)
    }
}
