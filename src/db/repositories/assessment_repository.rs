use sqlx::{Error, PgPool};
use time::Date;
use uuid::Uuid;

use crate::db::models::{ArchiveLink, Assessment, AssessmentWithModule, NewAssessment};

const JOINED_COLUMNS: &str = r#"
    a.id, a.module_id, a.trainee_id, a.trainee_name, a.assessor_id, a.assessor_name,
    a.assessment_date, a.score_achieved, a.max_score, a.pass_mark, a.passed,
    a.expiry_date, a.proof_scan_path, a.proof_scan_filename, a.notes,
    a.gdrive_file_id, a.gdrive_pdf_link, a.gdrive_folder_id,
    m.module_name, m.refresher_period_months
"#;

pub struct AssessmentRepository;

impl AssessmentRepository {
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AssessmentWithModule>, Error> {
        sqlx::query_as::<_, AssessmentWithModule>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM training_assessments a
            JOIN training_modules m ON m.id = a.module_id
            ORDER BY a.assessment_date DESC
            "#,
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<AssessmentWithModule>, Error> {
        sqlx::query_as::<_, AssessmentWithModule>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM training_assessments a
            JOIN training_modules m ON m.id = a.module_id
            WHERE a.id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_for_employee(
        pool: &PgPool,
        trainee_id: Uuid,
    ) -> Result<Vec<AssessmentWithModule>, Error> {
        sqlx::query_as::<_, AssessmentWithModule>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM training_assessments a
            JOIN training_modules m ON m.id = a.module_id
            WHERE a.trainee_id = $1
            ORDER BY a.assessment_date DESC
            "#,
        ))
        .bind(trainee_id)
        .fetch_all(pool)
        .await
    }

    /// Raw rows for the compliance engine, which filters internally.
    pub async fn history(pool: &PgPool) -> Result<Vec<Assessment>, Error> {
        sqlx::query_as::<_, Assessment>("SELECT * FROM training_assessments")
            .fetch_all(pool)
            .await
    }

    pub async fn history_for_employee(
        pool: &PgPool,
        trainee_id: Uuid,
    ) -> Result<Vec<Assessment>, Error> {
        sqlx::query_as::<_, Assessment>(
            "SELECT * FROM training_assessments WHERE trainee_id = $1",
        )
        .bind(trainee_id)
        .fetch_all(pool)
        .await
    }

    /// Insert with the module's scoring fields snapshotted and the derived
    /// `passed`/`expiry_date` computed by the caller exactly once.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        new_assessment: &NewAssessment,
        trainee_name: &str,
        assessor_id: Uuid,
        assessor_name: &str,
        max_score: i32,
        pass_mark: i32,
        passed: bool,
        expiry_date: Option<Date>,
        created_by: Uuid,
    ) -> Result<Assessment, Error> {
        sqlx::query_as::<_, Assessment>(
            r#"
            INSERT INTO training_assessments
                (module_id, trainee_id, trainee_name, assessor_id, assessor_name,
                 assessment_date, score_achieved, max_score, pass_mark, passed,
                 expiry_date, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(new_assessment.module_id)
        .bind(new_assessment.trainee_id)
        .bind(trainee_name)
        .bind(assessor_id)
        .bind(assessor_name)
        .bind(new_assessment.assessment_date)
        .bind(new_assessment.score_achieved)
        .bind(max_score)
        .bind(pass_mark)
        .bind(passed)
        .bind(expiry_date)
        .bind(&new_assessment.notes)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn set_proof_scan(
        pool: &PgPool,
        id: Uuid,
        path: &str,
        filename: &str,
    ) -> Result<Assessment, Error> {
        sqlx::query_as::<_, Assessment>(
            r#"
            UPDATE training_assessments
            SET proof_scan_path = $1, proof_scan_filename = $2, updated_at = NOW()
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

    pub async fn set_archive_link(
        pool: &PgPool,
        id: Uuid,
        link: &ArchiveLink,
    ) -> Result<Assessment, Error> {
        sqlx::query_as::<_, Assessment>(
            r#"
            UPDATE training_assessments
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
