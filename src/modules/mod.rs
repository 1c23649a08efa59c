pub mod assessments;
pub mod dashboard;
pub mod employees;
pub mod notifications;
pub mod sessions;
pub mod training_modules;
