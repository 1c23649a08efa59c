use serde::{Deserialize, Serialize};
use sqlx::types::{Json, Uuid};
use time::{Date, OffsetDateTime};
use validator::Validate;

/// Per-topic outcome for a delivered session. Three-valued: a topic that
/// does not apply to the trainee's role is neither covered (that would claim
/// training occurred) nor not-covered (that would flag a gap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicState {
    Covered,
    NotCovered,
    NotApplicable,
}

/// A training delivery event. Immutable once created, apart from the
/// archival-link enrichment written after the PDF reaches Drive.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: Uuid,
    pub module_id: Uuid,
    pub trainee_id: Uuid,
    pub trainee_name: String,
    pub trainer_id: Uuid,
    pub trainer_name: String,
    pub session_date: Date,
    /// Index-aligned with the module syllabus at time of recording.
    pub topics_completed: Json<Vec<TopicState>>,
    /// Snapshot computed once at creation; the compliance engine trusts it.
    pub all_topics_covered: bool,
    pub trainer_declaration: bool,
    pub trainee_signature_data: Option<String>,
    pub notes: Option<String>,
    pub gdrive_file_id: Option<String>,
    pub gdrive_pdf_link: Option<String>,
    pub gdrive_folder_id: Option<String>,
    pub created_by: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewTrainingSession {
    pub module_id: Uuid,
    pub trainee_id: Uuid,
    pub session_date: Date,
    #[serde(default)]
    pub topics_completed: Vec<TopicState>,
    pub trainer_declaration: bool,
    /// Base64 PNG captured by the signature pad in the UI.
    pub trainee_signature_data: Option<String>,
    pub notes: Option<String>,
}

/// Session row with the referenced module's name and syllabus joined in,
/// for detail views.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SessionWithModule {
    pub id: Uuid,
    pub module_id: Uuid,
    pub trainee_id: Uuid,
    pub trainee_name: String,
    pub trainer_id: Uuid,
    pub trainer_name: String,
    pub session_date: Date,
    pub topics_completed: Json<Vec<TopicState>>,
    pub all_topics_covered: bool,
    pub trainer_declaration: bool,
    pub trainee_signature_data: Option<String>,
    pub notes: Option<String>,
    pub gdrive_file_id: Option<String>,
    pub gdrive_pdf_link: Option<String>,
    pub gdrive_folder_id: Option<String>,
    pub module_name: String,
    pub module_version: String,
    pub syllabus: Json<Vec<String>>,
}

/// Drive references written back onto a record after successful archival.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveLink {
    pub gdrive_file_id: String,
    pub gdrive_pdf_link: String,
    pub gdrive_folder_id: Option<String>,
}
