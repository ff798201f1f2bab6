use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_bool_flag;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "notification.ts")]
pub struct NotificationListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_bool_flag")]
    pub unread_only: bool,
}

// 存储层查询
#[derive(Debug, Clone, Default)]
pub struct NotificationListQuery {
    pub page: u64,
    pub size: u64,
    pub unread_only: bool,
}
