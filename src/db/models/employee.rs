use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::Date;

/// Employee identity as recorded by the HR onboarding system. Rows are
/// created and maintained by that system; this service only reads them.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    pub date_of_birth: Option<Date>,
    pub status: String,
}
