use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct HealthResponse {
    pub status: String,
    pub database: bool,
    pub ai_configured: bool,
    pub uptime_seconds: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub version: String,
}
