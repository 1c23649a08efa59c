use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::types::Json as SqlJson;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::{self, AuthUser};
use crate::compliance::policy;
use crate::db::{
    ArchiveLink, EmployeeRepository, ModuleRepository, NewTrainingSession, SessionRepository,
    SessionWithModule, TrainingModule, TrainingSession,
};
use crate::error::{AppError, AppResult};
use crate::pdf;
use crate::services::archive::drive_file_name;
use crate::services::ArchiveUpload;

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<SessionWithModule>>> {
    auth::current_profile(&state, &user).await?;
    let sessions = SessionRepository::list_all(&state.db).await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionWithModule>> {
    auth::current_profile(&state, &user).await?;
    let session = SessionRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
    Ok(Json(session))
}

/// Record a training session. The primary insert is strict; PDF archival is
/// best-effort enrichment afterwards and never fails the request.
pub async fn create_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewTrainingSession>,
) -> AppResult<(StatusCode, Json<TrainingSession>)> {
    let profile = auth::current_profile(&state, &user).await?;
    auth::require_recorder(&profile)?;

    payload.validate()?;
    if !payload.trainer_declaration {
        return Err(AppError::Validation(
            "The trainer declaration must be confirmed".to_string(),
        ));
    }
    if payload
        .trainee_signature_data
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        return Err(AppError::Validation(
            "Trainee signature is required".to_string(),
        ));
    }

    let module = ModuleRepository::get(&state.db, payload.module_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", payload.module_id)))?;
    if !module.is_active {
        return Err(AppError::Validation(
            "Sessions can only be logged against active modules".to_string(),
        ));
    }
    // Topic states are index-aligned with the syllabus; a mismatched length
    // means the client was looking at a stale module version.
    if payload.topics_completed.len() != module.syllabus.0.len() {
        return Err(AppError::Validation(format!(
            "Topic checklist has {} entries but the syllabus has {}",
            payload.topics_completed.len(),
            module.syllabus.0.len()
        )));
    }

    let trainee = EmployeeRepository::get(&state.db, payload.trainee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", payload.trainee_id)))?;

    let all_covered = policy::all_topics_covered(&payload.topics_completed);

    let session = SessionRepository::create(
        &state.db,
        &payload,
        &trainee.full_name,
        profile.id,
        &profile.full_name,
        all_covered,
        profile.id,
    )
    .await?;

    // Best-effort enrichment: archive the session log PDF to Drive. The
    // record above is authoritative with or without it.
    if let Err(e) = archive_session_pdf(&state, &session, &module).await {
        warn!(session_id = %session.id, error = %e, "Session PDF archival failed (record saved)");
    }

    Ok((StatusCode::CREATED, Json(session)))
}

async fn archive_session_pdf(
    state: &AppState,
    session: &TrainingSession,
    module: &TrainingModule,
) -> anyhow::Result<()> {
    let Some(archive) = state.archive.as_deref() else {
        return Ok(());
    };

    let joined = SessionWithModule {
        id: session.id,
        module_id: session.module_id,
        trainee_id: session.trainee_id,
        trainee_name: session.trainee_name.clone(),
        trainer_id: session.trainer_id,
        trainer_name: session.trainer_name.clone(),
        session_date: session.session_date,
        topics_completed: SqlJson(session.topics_completed.0.clone()),
        all_topics_covered: session.all_topics_covered,
        trainer_declaration: session.trainer_declaration,
        trainee_signature_data: session.trainee_signature_data.clone(),
        notes: session.notes.clone(),
        gdrive_file_id: None,
        gdrive_pdf_link: None,
        gdrive_folder_id: None,
        module_name: module.module_name.clone(),
        module_version: module.version_number.clone(),
        syllabus: SqlJson(module.syllabus.0.clone()),
    };

    let bytes = pdf::session_log_pdf(&joined, OffsetDateTime::now_utc())?;
    let result = archive
        .upload(&ArchiveUpload {
            employee_name: session.trainee_name.clone(),
            file_name: drive_file_name(
                "Training",
                &session.trainee_name,
                &module.module_name,
                session.session_date,
            ),
            bytes,
            mime_type: "application/pdf".to_string(),
            subfolder: format!("Training Records/{}", module.module_name),
        })
        .await?;

    SessionRepository::set_archive_link(
        &state.db,
        session.id,
        &ArchiveLink {
            gdrive_file_id: result.file_id,
            gdrive_pdf_link: result.web_view_link,
            gdrive_folder_id: result.folder_id,
        },
    )
    .await?;
    Ok(())
}
