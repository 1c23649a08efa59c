use sqlx::types::Json;
use sqlx::{Error, PgPool};
use uuid::Uuid;

use crate::db::models::{
    ArchiveLink, NewTrainingSession, SessionWithModule, TrainingSession,
};

const JOINED_COLUMNS: &str = r#"
    s.id, s.module_id, s.trainee_id, s.trainee_name, s.trainer_id, s.trainer_name,
    s.session_date, s.topics_completed, s.all_topics_covered, s.trainer_declaration,
    s.trainee_signature_data, s.notes, s.gdrive_file_id, s.gdrive_pdf_link,
    s.gdrive_folder_id, m.module_name, m.version_number AS module_version, m.syllabus
"#;

pub struct SessionRepository;

impl SessionRepository {
    pub async fn list_all(pool: &PgPool) -> Result<Vec<SessionWithModule>, Error> {
        sqlx::query_as::<_, SessionWithModule>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM training_sessions s
            JOIN training_modules m ON m.id = s.module_id
            ORDER BY s.session_date DESC
            "#,
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<SessionWithModule>, Error> {
        sqlx::query_as::<_, SessionWithModule>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM training_sessions s
            JOIN training_modules m ON m.id = s.module_id
            WHERE s.id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_for_employee(
        pool: &PgPool,
        trainee_id: Uuid,
    ) -> Result<Vec<SessionWithModule>, Error> {
        sqlx::query_as::<_, SessionWithModule>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM training_sessions s
            JOIN training_modules m ON m.id = s.module_id
            WHERE s.trainee_id = $1
            ORDER BY s.session_date DESC
            "#,
        ))
        .bind(trainee_id)
        .fetch_all(pool)
        .await
    }

    /// Raw rows for the compliance engine, which filters internally.
    pub async fn history(pool: &PgPool) -> Result<Vec<TrainingSession>, Error> {
        sqlx::query_as::<_, TrainingSession>("SELECT * FROM training_sessions")
            .fetch_all(pool)
            .await
    }

    pub async fn history_for_employee(
        pool: &PgPool,
        trainee_id: Uuid,
    ) -> Result<Vec<TrainingSession>, Error> {
        sqlx::query_as::<_, TrainingSession>(
            "SELECT * FROM training_sessions WHERE trainee_id = $1",
        )
        .bind(trainee_id)
        .fetch_all(pool)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        new_session: &NewTrainingSession,
        trainee_name: &str,
        trainer_id: Uuid,
        trainer_name: &str,
        all_topics_covered: bool,
        created_by: Uuid,
    ) -> Result<TrainingSession, Error> {
        sqlx::query_as::<_, TrainingSession>(
            r#"
            INSERT INTO training_sessions
                (module_id, trainee_id, trainee_name, trainer_id, trainer_name,
                 session_date, topics_completed, all_topics_covered,
                 trainer_declaration, trainee_signature_data, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(new_session.module_id)
        .bind(new_session.trainee_id)
        .bind(trainee_name)
        .bind(trainer_id)
        .bind(trainer_name)
        .bind(new_session.session_date)
        .bind(Json(&new_session.topics_completed))
        .bind(all_topics_covered)
        .bind(new_session.trainer_declaration)
        .bind(&new_session.trainee_signature_data)
        .bind(&new_session.notes)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn set_archive_link(
        pool: &PgPool,
        id: Uuid,
        link: &ArchiveLink,
    ) -> Result<TrainingSession, Error> {
        sqlx::query_as::<_, TrainingSession>(
            r#"
            UPDATE training_sessions
            SET gdrive_file_id = $1, gdrive_pdf_link = $2, gdrive_folder_id = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&link.gdrive_file_id)
        .bind(&link.gdrive_pdf_link)
        .bind(&link.gdrive_folder_id)
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
