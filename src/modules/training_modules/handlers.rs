use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::{self, AuthUser};
use crate::db::{
    AssessmentType, FilePayload, ModuleFile, ModuleRepository, NewTrainingModule, TrainingModule,
    UpdateTrainingModule,
};
use crate::error::{AppError, AppResult};
use crate::services::{sanitize_filename, StorageClient};

const SIGNED_URL_TTL_SECONDS: u32 = 3600;

fn storage(state: &AppState) -> AppResult<&StorageClient> {
    state.storage.as_deref().ok_or_else(|| {
        AppError::ServiceUnavailable("Object storage is not configured".to_string())
    })
}

fn decode_file(payload: &FilePayload) -> AppResult<Vec<u8>> {
    BASE64
        .decode(payload.content_base64.as_bytes())
        .map_err(|_| AppError::BadRequest("File content is not valid base64".to_string()))
}

fn file_ext(filename: &str) -> &str {
    filename.rsplit('.').next().unwrap_or("bin")
}

#[derive(Debug, Deserialize)]
pub struct ListModulesParams {
    pub active: Option<bool>,
}

pub async fn list_modules(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListModulesParams>,
) -> AppResult<Json<Vec<TrainingModule>>> {
    auth::current_profile(&state, &user).await?;
    let modules = ModuleRepository::list(&state.db, params.active.unwrap_or(false)).await?;
    Ok(Json(modules))
}

pub async fn get_module(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TrainingModule>> {
    auth::current_profile(&state, &user).await?;
    let module = ModuleRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", id)))?;
    Ok(Json(module))
}

pub async fn create_module(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewTrainingModule>,
) -> AppResult<(StatusCode, Json<TrainingModule>)> {
    let profile = auth::current_profile(&state, &user).await?;
    auth::require_manager(&profile)?;

    payload.validate()?;
    payload.validate_scoring().map_err(AppError::Validation)?;

    let module = ModuleRepository::create(&state.db, &payload, profile.id).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

pub async fn update_module(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTrainingModule>,
) -> AppResult<Json<TrainingModule>> {
    let profile = auth::current_profile(&state, &user).await?;
    auth::require_manager(&profile)?;

    payload.validate()?;

    let existing = ModuleRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", id)))?;

    // Cross-field check against the state the row will end up in.
    let effective_type = payload.assessment_type.unwrap_or(existing.assessment_type);
    if effective_type == AssessmentType::ScoredQuiz {
        let max_score = payload.max_score.or(existing.max_score);
        let pass_mark = payload.pass_mark.or(existing.pass_mark);
        match (max_score, pass_mark) {
            (Some(max), _) if max < 1 => {
                return Err(AppError::Validation("Max score must be at least 1".to_string()))
            }
            (_, Some(pass)) if pass < 1 => {
                return Err(AppError::Validation("Pass mark must be at least 1".to_string()))
            }
            (Some(max), Some(pass)) if pass > max => {
                return Err(AppError::Validation(
                    "Pass mark cannot exceed max score".to_string(),
                ))
            }
            (None, _) | (_, None) => {
                return Err(AppError::Validation(
                    "Scored modules need a max score and a pass mark".to_string(),
                ))
            }
            _ => {}
        }
    }

    let module = ModuleRepository::update(&state.db, id, &payload).await?;
    Ok(Json(module))
}

/// Attach the module's source material PDF. Replaces any previous upload.
pub async fn upload_source_pdf(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FilePayload>,
) -> AppResult<Json<TrainingModule>> {
    let profile = auth::current_profile(&state, &user).await?;
    auth::require_manager(&profile)?;
    payload.validate()?;

    ModuleRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", id)))?;

    let store = storage(&state)?;
    let bytes = decode_file(&payload)?;
    let path = format!("{}/source.{}", id, file_ext(&payload.filename));
    let mime = payload.mime_type.as_deref().unwrap_or("application/pdf");
    store
        .upload(store.materials_bucket(), &path, bytes, mime, true)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to upload module PDF: {}", e)))?;

    let module = ModuleRepository::set_source_pdf(&state.db, id, &path, &payload.filename).await?;
    Ok(Json(module))
}

/// Add auxiliary module files (printable quizzes, answer sheets, handouts).
pub async fn add_module_files(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payloads): Json<Vec<FilePayload>>,
) -> AppResult<Json<TrainingModule>> {
    let profile = auth::current_profile(&state, &user).await?;
    auth::require_manager(&profile)?;

    let existing = ModuleRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", id)))?;

    let store = storage(&state)?;
    let mut files = existing.module_files.0.clone();
    for payload in &payloads {
        payload.validate()?;
        let bytes = decode_file(payload)?;
        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        let path = format!(
            "{}/files/{}_{}",
            id,
            timestamp,
            sanitize_filename(&payload.filename)
        );
        let mime = payload
            .mime_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        let size = bytes.len() as i64;
        store
            .upload(store.materials_bucket(), &path, bytes, mime, false)
            .await
            .map_err(|e| {
                AppError::InternalServerError(format!("Failed to upload module file: {}", e))
            })?;
        files.push(ModuleFile {
            path,
            filename: payload.filename.clone(),
            size,
        });
    }

    let module = ModuleRepository::set_module_files(&state.db, id, &files).await?;
    Ok(Json(module))
}

#[derive(Debug, Deserialize)]
pub struct DeleteFileRequest {
    pub path: String,
}

/// Remove an auxiliary file from the module manifest. The storage delete is
/// best-effort: an orphaned object is preferable to a dangling manifest
/// entry.
pub async fn delete_module_file(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<DeleteFileRequest>,
) -> AppResult<Json<TrainingModule>> {
    let profile = auth::current_profile(&state, &user).await?;
    auth::require_manager(&profile)?;

    let existing = ModuleRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", id)))?;

    if !existing.module_files.0.iter().any(|f| f.path == request.path) {
        return Err(AppError::NotFound(format!(
            "Module file {} not found",
            request.path
        )));
    }

    let store = storage(&state)?;
    if let Err(e) = store.remove(store.materials_bucket(), &request.path).await {
        warn!(module_id = %id, path = %request.path, error = %e, "Failed to delete module file from storage");
    }

    let files: Vec<ModuleFile> = existing
        .module_files
        .0
        .iter()
        .filter(|f| f.path != request.path)
        .cloned()
        .collect();
    let module = ModuleRepository::set_module_files(&state.db, id, &files).await?;
    Ok(Json(module))
}

#[derive(Debug, Deserialize)]
pub struct FileUrlParams {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct FileUrlResponse {
    pub url: String,
}

/// Time-limited download URL for a module file or source PDF.
pub async fn module_file_url(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(params): Query<FileUrlParams>,
) -> AppResult<Json<FileUrlResponse>> {
    auth::current_profile(&state, &user).await?;

    // The path must belong to this module's stored artefacts.
    if !params.path.starts_with(&format!("{}/", id)) {
        return Err(AppError::BadRequest(
            "Path does not belong to this module".to_string(),
        ));
    }

    let store = storage(&state)?;
    let url = store
        .signed_url(store.materials_bucket(), &params.path, SIGNED_URL_TTL_SECONDS)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to sign file URL: {}", e)))?;
    Ok(Json(FileUrlResponse { url }))
}
