pub mod ai;

pub mod assignments;

pub mod audit_logs;

pub mod auth;

pub mod courses;

pub mod departments;

pub mod grades;

pub mod notifications;

pub mod quizzes;

pub mod system;

pub mod users;

pub use ai::configure_ai_routes;
pub use assignments::configure_assignment_routes;
pub use audit_logs::configure_audit_log_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use departments::configure_department_routes;
pub use grades::configure_grade_routes;
pub use notifications::configure_notification_routes;
pub use quizzes::configure_quiz_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
