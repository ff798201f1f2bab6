use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "department.ts")]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub code: String,
    pub head_id: Option<i64>,
}
