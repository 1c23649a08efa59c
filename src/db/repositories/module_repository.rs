use sqlx::types::Json;
use sqlx::{Error, PgPool};
use uuid::Uuid;

use crate::db::models::{
    AssessmentType, ModuleFile, NewTrainingModule, TrainingModule, UpdateTrainingModule,
};

pub struct ModuleRepository;

impl ModuleRepository {
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<TrainingModule>, Error> {
        sqlx::query_as::<_, TrainingModule>(
            r#"
            SELECT *
            FROM training_modules
            WHERE NOT $1 OR is_active
            ORDER BY module_name ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(pool)
        .await
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<TrainingModule>, Error> {
        sqlx::query_as::<_, TrainingModule>(
            r#"
            SELECT *
            FROM training_modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        new_module: &NewTrainingModule,
        created_by: Uuid,
    ) -> Result<TrainingModule, Error> {
        // Scoring fields only make sense on scored modules.
        let scored = new_module.assessment_type == AssessmentType::ScoredQuiz;
        sqlx::query_as::<_, TrainingModule>(
            r#"
            INSERT INTO training_modules
                (module_name, version_number, assessment_type, refresher_period_months,
                 syllabus, max_score, pass_mark, is_active, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&new_module.module_name)
        .bind(&new_module.version_number)
        .bind(new_module.assessment_type)
        .bind(new_module.refresher_period_months)
        .bind(Json(&new_module.syllabus))
        .bind(new_module.max_score.filter(|_| scored))
        .bind(new_module.pass_mark.filter(|_| scored))
        .bind(new_module.is_active)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        updates: &UpdateTrainingModule,
    ) -> Result<TrainingModule, Error> {
        sqlx::query_as::<_, TrainingModule>(
            r#"
            UPDATE training_modules
            SET
                module_name = COALESCE($1, module_name),
                version_number = COALESCE($2, version_number),
                assessment_type = COALESCE($3, assessment_type),
                refresher_period_months = COALESCE($4, refresher_period_months),
                syllabus = COALESCE($5, syllabus),
                max_score = COALESCE($6, max_score),
                pass_mark = COALESCE($7, pass_mark),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&updates.module_name)
        .bind(&updates.version_number)
        .bind(updates.assessment_type)
        .bind(updates.refresher_period_months)
        .bind(updates.syllabus.as_ref().map(Json))
        .bind(updates.max_score)
        .bind(updates.pass_mark)
        .bind(updates.is_active)
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn set_source_pdf(
        pool: &PgPool,
        id: Uuid,
        path: &str,
        filename: &str,
    ) -> Result<TrainingModule, Error> {
        sqlx::query_as::<_, TrainingModule>(
            r#"
            UPDATE training_modules
            SET source_pdf_path = $1, source_pdf_filename = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(path)
        .bind(filename)
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn set_module_files(
        pool: &PgPool,
        id: Uuid,
        files: &[ModuleFile],
    ) -> Result<TrainingModule, Error> {
        sqlx::query_as::<_, TrainingModule>(
            r#"
            UPDATE training_modules
            SET module_files = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(Json(files))
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
