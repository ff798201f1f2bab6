pub mod extractor;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod random_code;
pub mod sql;
pub mod validate;

pub use extractor::{
    SafeAssignmentIdI64, SafeCourseIdI64, SafeEnrollmentIdI64, SafeIDI64, SafeNotificationIdI64,
    SafeQuizIdI64, SafeStudentIdI64, SafeSubmissionIdI64,
};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
