use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::{self, AuthUser};
use crate::compliance::policy;
use crate::db::{
    ArchiveLink, Assessment, AssessmentRepository, AssessmentType, AssessmentWithModule,
    EmployeeRepository, FilePayload, ModuleRepository, NewAssessment, NewNotification,
    NotificationRepository, NotificationSeverity, TrainingModule,
};
use crate::error::{AppError, AppResult};
use crate::pdf;
use crate::services::archive::drive_file_name;
use crate::services::ArchiveUpload;

pub async fn list_assessments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<AssessmentWithModule>>> {
    auth::current_profile(&state, &user).await?;
    let assessments = AssessmentRepository::list_all(&state.db).await?;
    Ok(Json(assessments))
}

pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AssessmentWithModule>> {
    auth::current_profile(&state, &user).await?;
    let assessment = AssessmentRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment {} not found", id)))?;
    Ok(Json(assessment))
}

/// Record a scored assessment.
///
/// The module's `max_score`/`pass_mark` are snapshotted onto the record and
/// `passed`/`expiry_date` derived exactly once here; the status engine
/// trusts the stored values from then on. The primary insert is strict;
/// proof upload, PDF archival and the failed-attempt notification are
/// best-effort enrichment afterwards.
pub async fn create_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewAssessment>,
) -> AppResult<(StatusCode, Json<Assessment>)> {
    let profile = auth::current_profile(&state, &user).await?;
    auth::require_recorder(&profile)?;

    payload.validate()?;

    let module = ModuleRepository::get(&state.db, payload.module_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", payload.module_id)))?;
    if !module.is_active {
        return Err(AppError::Validation(
            "Assessments can only be logged against active modules".to_string(),
        ));
    }
    if module.assessment_type != AssessmentType::ScoredQuiz {
        return Err(AppError::Validation(
            "This module is attendance-only and has no scored assessment".to_string(),
        ));
    }
    let (max_score, pass_mark) = match (module.max_score, module.pass_mark) {
        (Some(max), Some(pass)) => (max, pass),
        _ => {
            return Err(AppError::Validation(
                "Module is missing its scoring configuration".to_string(),
            ))
        }
    };
    if payload.score_achieved > max_score {
        return Err(AppError::Validation(format!(
            "Score cannot exceed {}",
            max_score
        )));
    }

    let trainee = EmployeeRepository::get(&state.db, payload.trainee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", payload.trainee_id)))?;

    let passed = policy::is_pass(payload.score_achieved, pass_mark);
    let expiry_date = policy::assessment_expiry(
        payload.assessment_date,
        module.refresher_period_months,
        passed,
    );

    let mut assessment = AssessmentRepository::create(
        &state.db,
        &payload,
        &trainee.full_name,
        profile.id,
        &profile.full_name,
        max_score,
        pass_mark,
        passed,
        expiry_date,
        profile.id,
    )
    .await?;

    // Best-effort enrichment from here on: the record stands as complete
    // whether or not any of these succeed.
    if let Some(proof) = &payload.proof_scan {
        match store_proof_scan(&state, assessment.id, proof).await {
            Ok(updated) => assessment = updated,
            Err(e) => {
                warn!(assessment_id = %assessment.id, error = %e, "Proof scan upload failed (record saved)");
            }
        }
    }

    if let Err(e) = archive_assessment_pdf(&state, &assessment, &module).await {
        warn!(assessment_id = %assessment.id, error = %e, "Assessment PDF archival failed (record saved)");
    }

    if !passed {
        if let Err(e) = notify_failed_attempt(&state, &assessment, &module).await {
            warn!(assessment_id = %assessment.id, error = %e, "Failed-attempt notification could not be created");
        }
    }

    Ok((StatusCode::CREATED, Json(assessment)))
}

async fn store_proof_scan(
    state: &AppState,
    assessment_id: Uuid,
    proof: &FilePayload,
) -> anyhow::Result<Assessment> {
    let Some(store) = state.storage.as_deref() else {
        anyhow::bail!("object storage is not configured");
    };
    proof.validate()?;
    let bytes = BASE64
        .decode(proof.content_base64.as_bytes())
        .map_err(|_| anyhow::anyhow!("proof scan is not valid base64"))?;
    let ext = proof.filename.rsplit('.').next().unwrap_or("jpg");
    let path = format!("{}/proof.{}", assessment_id, ext);
    let mime = proof.mime_type.as_deref().unwrap_or("image/jpeg");
    store
        .upload(store.scans_bucket(), &path, bytes, mime, true)
        .await?;
    let updated =
        AssessmentRepository::set_proof_scan(&state.db, assessment_id, &path, &proof.filename)
            .await?;
    Ok(updated)
}

async fn archive_assessment_pdf(
    state: &AppState,
    assessment: &Assessment,
    module: &TrainingModule,
) -> anyhow::Result<()> {
    let Some(archive) = state.archive.as_deref() else {
        return Ok(());
    };

    let joined = AssessmentWithModule {
        id: assessment.id,
        module_id: assessment.module_id,
        trainee_id: assessment.trainee_id,
        trainee_name: assessment.trainee_name.clone(),
        assessor_id: assessment.assessor_id,
        assessor_name: assessment.assessor_name.clone(),
        assessment_date: assessment.assessment_date,
        score_achieved: assessment.score_achieved,
        max_score: assessment.max_score,
        pass_mark: assessment.pass_mark,
        passed: assessment.passed,
        expiry_date: assessment.expiry_date,
        proof_scan_path: assessment.proof_scan_path.clone(),
        proof_scan_filename: assessment.proof_scan_filename.clone(),
        notes: assessment.notes.clone(),
        gdrive_file_id: None,
        gdrive_pdf_link: None,
        gdrive_folder_id: None,
        module_name: module.module_name.clone(),
        refresher_period_months: module.refresher_period_months,
    };

    let bytes = pdf::assessment_record_pdf(&joined, OffsetDateTime::now_utc())?;
    let result = archive
        .upload(&ArchiveUpload {
            employee_name: assessment.trainee_name.clone(),
            file_name: drive_file_name(
                "Assessment",
                &assessment.trainee_name,
                &module.module_name,
                assessment.assessment_date,
            ),
            bytes,
            mime_type: "application/pdf".to_string(),
            subfolder: format!("Training Records/{}", module.module_name),
        })
        .await?;

    AssessmentRepository::set_archive_link(
        &state.db,
        assessment.id,
        &ArchiveLink {
            gdrive_file_id: result.file_id,
            gdrive_pdf_link: result.web_view_link,
            gdrive_folder_id: result.folder_id,
        },
    )
    .await?;
    Ok(())
}

/// Flag a failed attempt to managers on the landing page.
async fn notify_failed_attempt(
    state: &AppState,
    assessment: &Assessment,
    module: &TrainingModule,
) -> anyhow::Result<()> {
    let notification = NewNotification {
        title: format!(
            "Failed: {} - {}",
            assessment.trainee_name, module.module_name
        ),
        message: format!(
            "Scored {}/{} (pass mark: {})",
            assessment.score_achieved, assessment.max_score, assessment.pass_mark
        ),
        severity: NotificationSeverity::Warning,
        action_url: Some(format!(
            "{}/#/assessment/{}",
            state.env.app.public_base_url, assessment.id
        )),
        record_id: Some(assessment.id),
    };
    NotificationRepository::create(&state.db, &notification, "training").await?;
    Ok(())
}
