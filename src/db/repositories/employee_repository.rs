use sqlx::{Error, PgPool};
use uuid::Uuid;

use crate::db::models::Employee;

/// Read-only access to the HR onboarding records this system treats as the
/// employee register.
pub struct EmployeeRepository;

impl EmployeeRepository {
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Employee>, Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, full_name, date_of_birth, status
            FROM onboarding_records
            ORDER BY full_name ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Employee>, Error> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, full_name, date_of_birth, status
            FROM onboarding_records
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
