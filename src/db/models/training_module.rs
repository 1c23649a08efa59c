use serde::{Deserialize, Serialize};
use sqlx::types::{Json, Uuid};
use time::OffsetDateTime;
use validator::Validate;

/// Determines which branch of the compliance engine applies to a module:
/// a scored test with a pass mark, or attendance with a topic checklist only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "assessment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    ScoredQuiz,
    AttendanceOnly,
}

/// Auxiliary module file (printable quiz, answer sheet, handout) kept in
/// object storage and listed on the module record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFile {
    pub path: String,
    pub filename: String,
    pub size: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TrainingModule {
    pub id: Uuid,
    pub module_name: String,
    pub version_number: String,
    pub assessment_type: AssessmentType,
    /// Validity window in months after a qualifying event.
    pub refresher_period_months: i32,
    /// Ordered topic list. Order is meaningful: session topic-state arrays
    /// are index-aligned with it.
    pub syllabus: Json<Vec<String>>,
    pub max_score: Option<i32>,
    pub pass_mark: Option<i32>,
    pub is_active: bool,
    pub source_pdf_path: Option<String>,
    pub source_pdf_filename: Option<String>,
    pub module_files: Json<Vec<ModuleFile>>,
    pub created_by: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_refresher() -> i32 {
    12
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewTrainingModule {
    #[validate(length(min = 1, message = "Module name is required"))]
    pub module_name: String,
    #[serde(default = "default_version")]
    pub version_number: String,
    pub assessment_type: AssessmentType,
    #[validate(range(min = 1, max = 120, message = "Refresher period must be 1-120 months"))]
    #[serde(default = "default_refresher")]
    pub refresher_period_months: i32,
    #[serde(default)]
    pub syllabus: Vec<String>,
    pub max_score: Option<i32>,
    pub pass_mark: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewTrainingModule {
    /// Cross-field checks the derive cannot express. Scoring fields are
    /// required for scored modules and must satisfy `pass_mark <= max_score`.
    pub fn validate_scoring(&self) -> Result<(), String> {
        if self.assessment_type != AssessmentType::ScoredQuiz {
            return Ok(());
        }
        let max_score = self.max_score.filter(|s| *s >= 1);
        let pass_mark = self.pass_mark.filter(|s| *s >= 1);
        match (max_score, pass_mark) {
            (None, _) => Err("Max score must be at least 1".to_string()),
            (_, None) => Err("Pass mark must be at least 1".to_string()),
            (Some(max), Some(pass)) if pass > max => {
                Err("Pass mark cannot exceed max score".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTrainingModule {
    #[validate(length(min = 1))]
    pub module_name: Option<String>,
    pub version_number: Option<String>,
    pub assessment_type: Option<AssessmentType>,
    #[validate(range(min = 1, max = 120))]
    pub refresher_period_months: Option<i32>,
    pub syllabus: Option<Vec<String>>,
    pub max_score: Option<i32>,
    pub pass_mark: Option<i32>,
    pub is_active: Option<bool>,
}

/// Base64 file body for upload endpoints, mirroring the shape the archival
/// gateway accepts.
#[derive(Debug, Deserialize, Validate)]
pub struct FilePayload {
    #[validate(length(min = 1, message = "Filename is required"))]
    pub filename: String,
    #[validate(length(min = 1, message = "File content is required"))]
    pub content_base64: String,
    pub mime_type: Option<String>,
}
