use sqlx::{Error, PgPool};
use uuid::Uuid;

use crate::db::models::UserProfile;

pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn get(pool: &PgPool, user_id: Uuid) -> Result<Option<UserProfile>, Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, full_name, role
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
