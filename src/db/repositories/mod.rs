mod assessment_repository;
mod employee_repository;
mod module_repository;
mod notification_repository;
mod profile_repository;
mod session_repository;

pub use assessment_repository::AssessmentRepository;
pub use employee_repository::EmployeeRepository;
pub use module_repository::ModuleRepository;
pub use notification_repository::NotificationRepository;
pub use profile_repository::ProfileRepository;
pub use session_repository::SessionRepository;
