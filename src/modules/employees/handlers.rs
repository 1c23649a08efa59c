use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{self, AuthUser};
use crate::compliance::{derive_status, MatrixCell};
use crate::db::{
    AssessmentRepository, AssessmentWithModule, Employee, EmployeeRepository, ModuleRepository,
    SessionRepository, SessionWithModule,
};
use crate::error::{AppError, AppResult};

pub async fn list_employees(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Employee>>> {
    auth::current_profile(&state, &user).await?;
    let employees = EmployeeRepository::list_all(&state.db).await?;
    Ok(Json(employees))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    auth::current_profile(&state, &user).await?;
    let employee = EmployeeRepository::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;
    Ok(Json(employee))
}

#[derive(Debug, Serialize)]
pub struct EmployeeTrainingResponse {
    pub employee: Employee,
    pub sessions: Vec<SessionWithModule>,
    pub assessments: Vec<AssessmentWithModule>,
    /// Derived status per active module, recomputed from the history above.
    pub statuses: Vec<MatrixCell>,
}

/// Training history view for one employee: sessions, assessments and the
/// derived status against every active module.
pub async fn employee_training(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EmployeeTrainingResponse>> {
    auth::current_profile(&state, &user).await?;

    let (employee, sessions, assessments, modules, raw_sessions, raw_assessments) = tokio::try_join!(
        EmployeeRepository::get(&state.db, id),
        SessionRepository::list_for_employee(&state.db, id),
        AssessmentRepository::list_for_employee(&state.db, id),
        ModuleRepository::list(&state.db, true),
        SessionRepository::history_for_employee(&state.db, id),
        AssessmentRepository::history_for_employee(&state.db, id),
    )?;

    let employee =
        employee.ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;

    let today = OffsetDateTime::now_utc().date();
    let statuses = modules
        .iter()
        .map(|module| MatrixCell {
            module_id: module.id,
            status: derive_status(id, module, &raw_assessments, &raw_sessions, today),
        })
        .collect();

    Ok(Json(EmployeeTrainingResponse {
        employee,
        sessions,
        assessments,
        statuses,
    }))
}
