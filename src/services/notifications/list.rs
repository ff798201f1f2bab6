use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::NotificationService;
use crate::models::{
    ApiError, ApiResult,
    notifications::{
        requests::{NotificationListParams, NotificationListQuery},
        responses::{NotificationListResponse, UnreadCountResponse},
    },
    users::entities::User,
};
use crate::services::{current_user, respond};
use crate::storage::Storage;

pub(crate) async fn list_notifications_inner(
    storage: &dyn Storage,
    actor: &User,
    params: NotificationListParams,
) -> ApiResult<NotificationListResponse> {
    let (page, size) = params.pagination.normalized();
    let query = NotificationListQuery {
        page,
        size,
        unread_only: params.unread_only,
    };
    storage
        .list_user_notifications(actor.id, query)
        .await
        .map_err(ApiError::from)
}

pub async fn list_notifications(
    service: &NotificationService,
    params: NotificationListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        list_notifications_inner(storage.as_ref(), &actor, params).await
    }
    .await;
    Ok(respond(result, "Notifications retrieved successfully"))
}

pub async fn unread_count(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        let unread_count = storage.count_unread_notifications(actor.id).await?;
        ApiResult::Ok(UnreadCountResponse { unread_count })
    }
    .await;
    Ok(respond(result, "Unread count retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationQuery;
    use crate::models::notifications::entities::{NewNotification, NotificationKind};
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_list_own_notifications() {
        let storage = test_support::storage().await;
        let alice = test_support::user(&storage, "alice", UserRole::Student, None).await;
        let bob = test_support::user(&storage, "bob", UserRole::Student, None).await;

        storage
            .create_notifications(vec![
                NewNotification::new(alice.id, NotificationKind::Enrollment, "one"),
                NewNotification::new(alice.id, NotificationKind::GradeRecorded, "two"),
                NewNotification::new(bob.id, NotificationKind::Enrollment, "other"),
            ])
            .await
            .unwrap();

        let params = NotificationListParams {
            pagination: PaginationQuery { page: 1, size: 1 },
            unread_only: true,
        };
        let page = list_notifications_inner(&storage, &alice, params).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(page.items.iter().all(|n| n.user_id == alice.id));
    }
}
