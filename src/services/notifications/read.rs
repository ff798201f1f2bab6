use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::NotificationService;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    notifications::{entities::Notification, responses::MarkAllReadResponse},
    users::entities::User,
};
use crate::services::{current_user, respond};
use crate::storage::Storage;

/// 标记单条通知为已读，他人的通知按不存在处理
pub(crate) async fn mark_read_inner(
    storage: &dyn Storage,
    actor: &User,
    notification_id: i64,
) -> ApiResult<Notification> {
    let mut notification = storage
        .get_notification_by_id(notification_id)
        .await?
        .filter(|n| n.user_id == actor.id)
        .ok_or_else(|| {
            ApiError::not_found(ErrorCode::NotificationNotFound, "Notification not found")
        })?;

    if !notification.is_read {
        storage
            .mark_notification_read(notification.id, actor.id)
            .await?;
        notification.is_read = true;
    }
    Ok(notification)
}

pub async fn mark_read(
    service: &NotificationService,
    notification_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        mark_read_inner(storage.as_ref(), &actor, notification_id).await
    }
    .await;
    Ok(respond(result, "Notification marked as read"))
}

pub async fn mark_all_read(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        let marked_count = storage.mark_all_notifications_read(actor.id).await?;
        ApiResult::Ok(MarkAllReadResponse { marked_count })
    }
    .await;
    Ok(respond(result, "All notifications marked as read"))
}
