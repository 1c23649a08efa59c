use axum::{extract::State, Extension, Json};
use time::OffsetDateTime;

use crate::app_state::AppState;
use crate::auth::{self, AuthUser};
use crate::compliance::{build_matrix, ComplianceMatrix};
use crate::db::{AssessmentRepository, EmployeeRepository, ModuleRepository, SessionRepository};
use crate::error::AppResult;

/// Full compliance snapshot: every employee against every active module.
///
/// The four collections are fetched concurrently and joined; if any fetch
/// fails the whole render fails rather than show partial data. Status is
/// recomputed from raw history on every call.
pub async fn compliance_matrix(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ComplianceMatrix>> {
    auth::current_profile(&state, &user).await?;

    let (employees, modules, assessments, sessions) = tokio::try_join!(
        EmployeeRepository::list_all(&state.db),
        ModuleRepository::list(&state.db, true),
        AssessmentRepository::history(&state.db),
        SessionRepository::history(&state.db),
    )?;

    let today = OffsetDateTime::now_utc().date();
    Ok(Json(build_matrix(
        &employees,
        &modules,
        &assessments,
        &sessions,
        today,
    )))
}
