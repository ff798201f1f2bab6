use serde::Deserialize;
use ts_rs::TS;

use super::entities::EnrollmentStatus;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct CreateEnrollmentRequest {
    pub student_id: i64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct UpdateEnrollmentRequest {
    pub status: EnrollmentStatus,
}
