use sqlx::{Error, PgPool};
use uuid::Uuid;

use crate::db::models::{NewNotification, Notification};

pub struct NotificationRepository;

impl NotificationRepository {
    pub async fn create(
        pool: &PgPool,
        new_notification: &NewNotification,
        source_app: &str,
    ) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (title, message, severity, action_url, record_id, source_app)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new_notification.title)
        .bind(&new_notification.message)
        .bind(new_notification.severity)
        .bind(&new_notification.action_url)
        .bind(new_notification.record_id)
        .bind(source_app)
        .fetch_one(pool)
        .await
    }

    pub async fn list_active(pool: &PgPool) -> Result<Vec<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT *
            FROM notifications
            WHERE dismissed_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn dismiss(pool: &PgPool, id: Uuid) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET dismissed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
