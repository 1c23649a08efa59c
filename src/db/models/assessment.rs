use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

/// A scored evaluation event against a `scored_quiz` module.
///
/// `max_score` and `pass_mark` are snapshots of the module at recording
/// time, and `passed`/`expiry_date` are derived from them exactly once at
/// creation. Later module edits never alter historical pass/fail.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub module_id: Uuid,
    pub trainee_id: Uuid,
    pub trainee_name: String,
    pub assessor_id: Uuid,
    pub assessor_name: String,
    pub assessment_date: Date,
    pub score_achieved: i32,
    pub max_score: i32,
    pub pass_mark: i32,
    pub passed: bool,
    /// Present iff `passed`.
    pub expiry_date: Option<Date>,
    pub proof_scan_path: Option<String>,
    pub proof_scan_filename: Option<String>,
    pub notes: Option<String>,
    pub gdrive_file_id: Option<String>,
    pub gdrive_pdf_link: Option<String>,
    pub gdrive_folder_id: Option<String>,
    pub created_by: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAssessment {
    pub module_id: Uuid,
    pub trainee_id: Uuid,
    pub assessment_date: Date,
    #[validate(range(min = 0, message = "Score cannot be negative"))]
    pub score_achieved: i32,
    pub notes: Option<String>,
    /// Optional photo of the marked assessment paper.
    pub proof_scan: Option<super::FilePayload>,
}

/// Assessment row with the referenced module's name and refresher period
/// joined in, for detail views.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AssessmentWithModule {
    pub id: Uuid,
    pub module_id: Uuid,
    pub trainee_id: Uuid,
    pub trainee_name: String,
    pub assessor_id: Uuid,
    pub assessor_name: String,
    pub assessment_date: Date,
    pub score_achieved: i32,
    pub max_score: i32,
    pub pass_mark: i32,
    pub passed: bool,
    pub expiry_date: Option<Date>,
    pub proof_scan_path: Option<String>,
    pub proof_scan_filename: Option<String>,
    pub notes: Option<String>,
    pub gdrive_file_id: Option<String>,
    pub gdrive_pdf_link: Option<String>,
    pub gdrive_folder_id: Option<String>,
    pub module_name: String,
    pub refresher_period_months: i32,
}
