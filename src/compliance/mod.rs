//! Compliance status derivation.
//!
//! Status is always recomputed from the raw session/assessment history at
//! read time; there is no cached status column to go stale after a
//! late-arriving record. The engine trusts the snapshots written at record
//! creation (`passed`, `expiry_date`, `all_topics_covered`) and never
//! recomputes them.

pub mod dates;
pub mod policy;

use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::db::{Assessment, AssessmentType, Employee, TrainingModule, TrainingSession};
use dates::expiring_soon_horizon;
use policy::expiry_after;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Qualified,
    ExpiringSoon,
    Expired,
    Failed,
    NotStarted,
}

/// Derive the compliance status for one (employee, module) pair.
///
/// Takes the complete record collections and filters internally; callers do
/// not pre-filter. Pure in all inputs: `today` is injected rather than read
/// from the clock.
pub fn derive_status(
    employee_id: Uuid,
    module: &TrainingModule,
    assessments: &[Assessment],
    sessions: &[TrainingSession],
    today: Date,
) -> ComplianceStatus {
    match module.assessment_type {
        AssessmentType::ScoredQuiz => scored_quiz_status(employee_id, module, assessments, today),
        AssessmentType::AttendanceOnly => attendance_status(employee_id, module, sessions, today),
    }
}

fn scored_quiz_status(
    employee_id: Uuid,
    module: &TrainingModule,
    assessments: &[Assessment],
    today: Date,
) -> ComplianceStatus {
    let latest_pass = assessments
        .iter()
        .filter(|a| a.trainee_id == employee_id && a.module_id == module.id && a.passed)
        // Ties on assessment_date break on creation time, then id, so the
        // winner is stable across runs.
        .max_by_key(|a| (a.assessment_date, a.created_at, a.id));

    let Some(latest) = latest_pass else {
        let has_failed_attempt = assessments
            .iter()
            .any(|a| a.trainee_id == employee_id && a.module_id == module.id && !a.passed);
        return if has_failed_attempt {
            ComplianceStatus::Failed
        } else {
            ComplianceStatus::NotStarted
        };
    };

    match latest.expiry_date {
        // No expiry on record: permanent qualification.
        None => ComplianceStatus::Qualified,
        Some(expiry) => classify_expiry(expiry, today),
    }
}

fn attendance_status(
    employee_id: Uuid,
    module: &TrainingModule,
    sessions: &[TrainingSession],
    today: Date,
) -> ComplianceStatus {
    let latest_covered = sessions
        .iter()
        .filter(|s| {
            s.trainee_id == employee_id && s.module_id == module.id && s.all_topics_covered
        })
        .max_by_key(|s| (s.session_date, s.created_at, s.id));

    // An incomplete session is indistinguishable from never having attended:
    // attendance modules have no failed state.
    let Some(latest) = latest_covered else {
        return ComplianceStatus::NotStarted;
    };

    let expiry = expiry_after(latest.session_date, module.refresher_period_months);
    classify_expiry(expiry, today)
}

fn classify_expiry(expiry: Date, today: Date) -> ComplianceStatus {
    if expiry < today {
        ComplianceStatus::Expired
    } else if expiry <= expiring_soon_horizon(today) {
        ComplianceStatus::ExpiringSoon
    } else {
        ComplianceStatus::Qualified
    }
}

#[derive(Debug, Serialize)]
pub struct MatrixModule {
    pub id: Uuid,
    pub module_name: String,
}

#[derive(Debug, Serialize)]
pub struct MatrixCell {
    pub module_id: Uuid,
    pub status: ComplianceStatus,
}

#[derive(Debug, Serialize)]
pub struct MatrixRow {
    pub employee_id: Uuid,
    pub full_name: String,
    pub cells: Vec<MatrixCell>,
}

#[derive(Debug, Serialize)]
pub struct ComplianceMatrix {
    pub modules: Vec<MatrixModule>,
    pub rows: Vec<MatrixRow>,
}

/// Dashboard snapshot: one status cell per employee x active module.
pub fn build_matrix(
    employees: &[Employee],
    modules: &[TrainingModule],
    assessments: &[Assessment],
    sessions: &[TrainingSession],
    today: Date,
) -> ComplianceMatrix {
    let rows = employees
        .iter()
        .map(|emp| MatrixRow {
            employee_id: emp.id,
            full_name: emp.full_name.clone(),
            cells: modules
                .iter()
                .map(|module| MatrixCell {
                    module_id: module.id,
                    status: derive_status(emp.id, module, assessments, sessions, today),
                })
                .collect(),
        })
        .collect();

    ComplianceMatrix {
        modules: modules
            .iter()
            .map(|m| MatrixModule {
                id: m.id,
                module_name: m.module_name.clone(),
            })
            .collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ModuleFile, TopicState};
    use sqlx::types::Json;
    use time::macros::{date, datetime};
    use time::OffsetDateTime;

    fn module(assessment_type: AssessmentType, refresher_months: i32) -> TrainingModule {
        TrainingModule {
            id: Uuid::new_v4(),
            module_name: "Forklift Operation".to_string(),
            version_number: "1.0".to_string(),
            assessment_type,
            refresher_period_months: refresher_months,
            syllabus: Json(vec!["Pre-checks".to_string(), "Loading".to_string()]),
            max_score: Some(20),
            pass_mark: Some(15),
            is_active: true,
            source_pdf_path: None,
            source_pdf_filename: None,
            module_files: Json(Vec::<ModuleFile>::new()),
            created_by: Uuid::new_v4(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn assessment(
        trainee_id: Uuid,
        module_id: Uuid,
        assessment_date: Date,
        passed: bool,
        expiry_date: Option<Date>,
        created_at: OffsetDateTime,
    ) -> Assessment {
        Assessment {
            id: Uuid::new_v4(),
            module_id,
            trainee_id,
            trainee_name: "Jo Bloggs".to_string(),
            assessor_id: Uuid::new_v4(),
            assessor_name: "Sam Trainer".to_string(),
            assessment_date,
            score_achieved: if passed { 18 } else { 9 },
            max_score: 20,
            pass_mark: 15,
            passed,
            expiry_date,
            proof_scan_path: None,
            proof_scan_filename: None,
            notes: None,
            gdrive_file_id: None,
            gdrive_pdf_link: None,
            gdrive_folder_id: None,
            created_by: Uuid::new_v4(),
            created_at,
            updated_at: created_at,
        }
    }

    fn session(
        trainee_id: Uuid,
        module_id: Uuid,
        session_date: Date,
        topics: Vec<TopicState>,
    ) -> TrainingSession {
        let all_covered = policy::all_topics_covered(&topics);
        TrainingSession {
            id: Uuid::new_v4(),
            module_id,
            trainee_id,
            trainee_name: "Jo Bloggs".to_string(),
            trainer_id: Uuid::new_v4(),
            trainer_name: "Sam Trainer".to_string(),
            session_date,
            topics_completed: Json(topics),
            all_topics_covered: all_covered,
            trainer_declaration: true,
            trainee_signature_data: None,
            notes: None,
            gdrive_file_id: None,
            gdrive_pdf_link: None,
            gdrive_folder_id: None,
            created_by: Uuid::new_v4(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    const T0: OffsetDateTime = datetime!(2024 - 01 - 15 10:00 UTC);

    #[test]
    fn no_assessments_means_not_started() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let status = derive_status(
            Uuid::new_v4(),
            &module,
            &[],
            &[],
            date!(2024 - 06 - 01),
        );
        assert_eq!(status, ComplianceStatus::NotStarted);
    }

    #[test]
    fn failed_attempt_with_no_pass_means_failed() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![assessment(
            trainee,
            module.id,
            date!(2024 - 01 - 15),
            false,
            None,
            T0,
        )];
        let status = derive_status(trainee, &module, &assessments, &[], date!(2024 - 06 - 01));
        assert_eq!(status, ComplianceStatus::Failed);
    }

    #[test]
    fn other_employees_records_do_not_leak() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![assessment(
            Uuid::new_v4(),
            module.id,
            date!(2024 - 01 - 15),
            true,
            Some(date!(2025 - 01 - 15)),
            T0,
        )];
        let status = derive_status(trainee, &module, &assessments, &[], date!(2024 - 06 - 01));
        assert_eq!(status, ComplianceStatus::NotStarted);
    }

    #[test]
    fn valid_pass_is_qualified() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![assessment(
            trainee,
            module.id,
            date!(2024 - 01 - 15),
            true,
            Some(date!(2025 - 01 - 15)),
            T0,
        )];
        let status = derive_status(trainee, &module, &assessments, &[], date!(2024 - 06 - 01));
        assert_eq!(status, ComplianceStatus::Qualified);
    }

    #[test]
    fn pass_past_expiry_is_expired() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![assessment(
            trainee,
            module.id,
            date!(2024 - 01 - 15),
            true,
            Some(date!(2025 - 01 - 15)),
            T0,
        )];
        let status = derive_status(trainee, &module, &assessments, &[], date!(2025 - 01 - 20));
        assert_eq!(status, ComplianceStatus::Expired);
    }

    #[test]
    fn pass_within_thirty_days_of_expiry_is_expiring_soon() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![assessment(
            trainee,
            module.id,
            date!(2024 - 01 - 15),
            true,
            Some(date!(2025 - 01 - 15)),
            T0,
        )];
        let status = derive_status(trainee, &module, &assessments, &[], date!(2025 - 01 - 01));
        assert_eq!(status, ComplianceStatus::ExpiringSoon);
    }

    #[test]
    fn expiry_today_is_still_expiring_soon_not_expired() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![assessment(
            trainee,
            module.id,
            date!(2024 - 01 - 15),
            true,
            Some(date!(2025 - 01 - 15)),
            T0,
        )];
        let status = derive_status(trainee, &module, &assessments, &[], date!(2025 - 01 - 15));
        assert_eq!(status, ComplianceStatus::ExpiringSoon);
    }

    #[test]
    fn pass_without_expiry_is_permanently_qualified() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![assessment(
            trainee,
            module.id,
            date!(2010 - 01 - 15),
            true,
            None,
            T0,
        )];
        let status = derive_status(trainee, &module, &assessments, &[], date!(2025 - 06 - 01));
        assert_eq!(status, ComplianceStatus::Qualified);
    }

    #[test]
    fn latest_pass_wins_over_older_expired_pass() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![
            assessment(
                trainee,
                module.id,
                date!(2022 - 01 - 15),
                true,
                Some(date!(2023 - 01 - 15)),
                T0,
            ),
            assessment(
                trainee,
                module.id,
                date!(2024 - 01 - 15),
                true,
                Some(date!(2025 - 01 - 15)),
                T0,
            ),
        ];
        let status = derive_status(trainee, &module, &assessments, &[], date!(2024 - 06 - 01));
        assert_eq!(status, ComplianceStatus::Qualified);
    }

    #[test]
    fn same_day_passes_tie_break_on_creation_time() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        // Same assessment_date; the later-created record carries the longer
        // expiry and must win regardless of collection order.
        let earlier = assessment(
            trainee,
            module.id,
            date!(2024 - 01 - 15),
            true,
            Some(date!(2024 - 02 - 01)),
            datetime!(2024 - 01 - 15 09:00 UTC),
        );
        let later = assessment(
            trainee,
            module.id,
            date!(2024 - 01 - 15),
            true,
            Some(date!(2025 - 01 - 15)),
            datetime!(2024 - 01 - 15 17:00 UTC),
        );
        for order in [vec![earlier.clone(), later.clone()], vec![later, earlier]] {
            let status = derive_status(trainee, &module, &order, &[], date!(2024 - 06 - 01));
            assert_eq!(status, ComplianceStatus::Qualified);
        }
    }

    #[test]
    fn attendance_module_with_no_sessions_is_not_started() {
        let module = module(AssessmentType::AttendanceOnly, 12);
        let status = derive_status(Uuid::new_v4(), &module, &[], &[], date!(2024 - 06 - 01));
        assert_eq!(status, ComplianceStatus::NotStarted);
    }

    #[test]
    fn incomplete_session_is_indistinguishable_from_no_session() {
        let module = module(AssessmentType::AttendanceOnly, 12);
        let trainee = Uuid::new_v4();
        let sessions = vec![session(
            trainee,
            module.id,
            date!(2024 - 05 - 01),
            vec![TopicState::Covered, TopicState::NotCovered],
        )];
        let status = derive_status(trainee, &module, &[], &sessions, date!(2024 - 06 - 01));
        assert_eq!(status, ComplianceStatus::NotStarted);
    }

    #[test]
    fn covered_session_qualifies_until_refresher_elapses() {
        let module = module(AssessmentType::AttendanceOnly, 12);
        let trainee = Uuid::new_v4();
        let sessions = vec![session(
            trainee,
            module.id,
            date!(2024 - 05 - 01),
            vec![TopicState::Covered, TopicState::NotApplicable],
        )];
        assert_eq!(
            derive_status(trainee, &module, &[], &sessions, date!(2024 - 06 - 01)),
            ComplianceStatus::Qualified
        );
        assert_eq!(
            derive_status(trainee, &module, &[], &sessions, date!(2025 - 04 - 15)),
            ComplianceStatus::ExpiringSoon
        );
        assert_eq!(
            derive_status(trainee, &module, &[], &sessions, date!(2025 - 05 - 02)),
            ComplianceStatus::Expired
        );
    }

    #[test]
    fn derive_status_is_idempotent() {
        let module = module(AssessmentType::ScoredQuiz, 12);
        let trainee = Uuid::new_v4();
        let assessments = vec![assessment(
            trainee,
            module.id,
            date!(2024 - 01 - 15),
            true,
            Some(date!(2025 - 01 - 15)),
            T0,
        )];
        let today = date!(2024 - 06 - 01);
        let first = derive_status(trainee, &module, &assessments, &[], today);
        let second = derive_status(trainee, &module, &assessments, &[], today);
        assert_eq!(first, second);
    }

    #[test]
    fn matrix_has_one_cell_per_employee_module_pair() {
        let quiz = module(AssessmentType::ScoredQuiz, 12);
        let attendance = module(AssessmentType::AttendanceOnly, 6);
        let employees = vec![
            Employee {
                id: Uuid::new_v4(),
                full_name: "Jo Bloggs".to_string(),
                date_of_birth: None,
                status: "active".to_string(),
            },
            Employee {
                id: Uuid::new_v4(),
                full_name: "Ada Smith".to_string(),
                date_of_birth: None,
                status: "active".to_string(),
            },
        ];
        let modules = vec![quiz, attendance];

        let matrix = build_matrix(&employees, &modules, &[], &[], date!(2024 - 06 - 01));

        assert_eq!(matrix.modules.len(), 2);
        assert_eq!(matrix.rows.len(), 2);
        for row in &matrix.rows {
            assert_eq!(row.cells.len(), 2);
            assert!(row
                .cells
                .iter()
                .all(|c| c.status == ComplianceStatus::NotStarted));
        }
    }
}
