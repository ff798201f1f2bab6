//! 通知存储操作

use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{EduSystemError, Result};
use crate::models::{
    PaginationInfo,
    notifications::{
        entities::{NewNotification, Notification},
        requests::NotificationListQuery,
        responses::NotificationListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 批量写入通知，返回写入条数
    pub async fn create_notifications_impl(
        &self,
        notifications: Vec<NewNotification>,
    ) -> Result<u64> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EduSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let mut count = 0u64;
        for n in notifications {
            let model = ActiveModel {
                user_id: Set(n.user_id),
                kind: Set(n.kind.to_string()),
                title: Set(n.title),
                content: Set(n.content),
                reference_type: Set(n.reference_type),
                reference_id: Set(n.reference_id),
                is_read: Set(false),
                created_at: Set(now),
                ..Default::default()
            };
            model
                .insert(&txn)
                .await
                .map_err(|e| EduSystemError::database_operation(format!("创建通知失败: {e}")))?;
            count += 1;
        }

        txn.commit()
            .await
            .map_err(|e| EduSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(count)
    }

    pub async fn get_notification_by_id_impl(&self, id: i64) -> Result<Option<Notification>> {
        let result = Notifications::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询通知失败: {e}")))?;

        Ok(result.and_then(|m| m.into_notification()))
    }

    /// 分页列出用户通知（新的在前）
    pub async fn list_user_notifications_impl(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Notifications::find().filter(Column::UserId.eq(user_id));
        if query.unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询通知总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询通知页数失败: {e}")))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询通知列表失败: {e}")))?;

        Ok(NotificationListResponse {
            items: models
                .into_iter()
                .filter_map(|m| m.into_notification())
                .collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn count_unread_notifications_impl(&self, user_id: i64) -> Result<i64> {
        let count = Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("统计未读通知失败: {e}")))?;

        Ok(count as i64)
    }

    /// 标记单条通知已读（只能操作自己的通知）
    pub async fn mark_notification_read_impl(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn mark_all_notifications_read_impl(&self, user_id: i64) -> Result<i64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("标记全部已读失败: {e}")))?;

        Ok(result.rows_affected as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::models::notifications::{
        entities::{NewNotification, NotificationKind},
        requests::NotificationListQuery,
    };
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_notification_read_flow() {
        let storage = test_support::storage().await;
        let alice = test_support::user(&storage, "alice", UserRole::Student, None).await;
        let bob = test_support::user(&storage, "bob", UserRole::Student, None).await;

        let created = storage
            .create_notifications(vec![
                NewNotification::new(alice.id, NotificationKind::Enrollment, "enrolled")
                    .reference("course", 1),
                NewNotification::new(alice.id, NotificationKind::GradeRecorded, "graded"),
                NewNotification::new(bob.id, NotificationKind::Enrollment, "enrolled"),
            ])
            .await
            .unwrap();
        assert_eq!(created, 3);
        assert_eq!(storage.count_unread_notifications(alice.id).await.unwrap(), 2);

        let list = storage
            .list_user_notifications(
                alice.id,
                NotificationListQuery {
                    page: 1,
                    size: 10,
                    unread_only: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(list.pagination.total, 2);
        let first_id = list.items[0].id;

        // 其他用户无法标记
        assert!(!storage.mark_notification_read(first_id, bob.id).await.unwrap());
        assert!(storage.mark_notification_read(first_id, alice.id).await.unwrap());
        assert_eq!(storage.count_unread_notifications(alice.id).await.unwrap(), 1);

        let unread = storage
            .list_user_notifications(
                alice.id,
                NotificationListQuery {
                    page: 1,
                    size: 10,
                    unread_only: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(unread.items.len(), 1);

        assert_eq!(storage.mark_all_notifications_read(alice.id).await.unwrap(), 1);
        assert_eq!(storage.count_unread_notifications(alice.id).await.unwrap(), 0);
        assert_eq!(storage.count_unread_notifications(bob.id).await.unwrap(), 1);
    }
}
