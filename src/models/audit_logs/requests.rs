use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_optional_i64;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "audit_log.ts")]
pub struct AuditLogListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub actor_id: Option<i64>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
}

// 存储层查询
#[derive(Debug, Clone, Default)]
pub struct AuditLogListQuery {
    pub page: u64,
    pub size: u64,
    pub actor_id: Option<i64>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
}
