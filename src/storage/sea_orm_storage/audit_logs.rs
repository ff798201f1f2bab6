//! 审计日志存储操作

use super::SeaOrmStorage;
use crate::entity::audit_logs::{ActiveModel, Column, Entity as AuditLogs};
use crate::errors::{EduSystemError, Result};
use crate::models::{
    PaginationInfo,
    audit_logs::{
        entities::{AuditLog, NewAuditLog},
        requests::AuditLogListQuery,
        responses::AuditLogListResponse,
    },
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_audit_log_impl(&self, log: NewAuditLog) -> Result<AuditLog> {
        let details = log
            .details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let model = ActiveModel {
            actor_id: Set(log.actor_id),
            action: Set(log.action),
            entity_type: Set(log.entity_type),
            entity_id: Set(log.entity_id),
            details: Set(details),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("写入审计日志失败: {e}")))?;

        Ok(result.into_audit_log())
    }

    /// 分页查询审计日志（新的在前）
    pub async fn list_audit_logs_impl(
        &self,
        query: AuditLogListQuery,
    ) -> Result<AuditLogListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = AuditLogs::find();
        if let Some(actor_id) = query.actor_id {
            select = select.filter(Column::ActorId.eq(actor_id));
        }
        if let Some(ref action) = query.action {
            select = select.filter(Column::Action.eq(action.as_str()));
        }
        if let Some(ref entity_type) = query.entity_type {
            select = select.filter(Column::EntityType.eq(entity_type.as_str()));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询审计日志总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询审计日志页数失败: {e}")))?;
        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询审计日志失败: {e}")))?;

        Ok(AuditLogListResponse {
            items: models.into_iter().map(|m| m.into_audit_log()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::models::audit_logs::{
        entities::{NewAuditLog, actions},
        requests::AuditLogListQuery,
    };
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_audit_log_filters() {
        let storage = test_support::storage().await;
        let admin = test_support::user(&storage, "root", UserRole::Admin, None).await;

        storage
            .create_audit_log(
                NewAuditLog::new(admin.id, actions::COURSE_CREATE, "course", Some(1))
                    .details(serde_json::json!({"code": "CS101"})),
            )
            .await
            .unwrap();
        storage
            .create_audit_log(NewAuditLog::new(
                admin.id,
                actions::GRADE_RECORD,
                "grade",
                Some(7),
            ))
            .await
            .unwrap();

        let all = storage
            .list_audit_logs(AuditLogListQuery {
                page: 1,
                size: 20,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);

        let courses = storage
            .list_audit_logs(AuditLogListQuery {
                page: 1,
                size: 20,
                entity_type: Some("course".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(courses.items.len(), 1);
        assert_eq!(
            courses.items[0].details,
            Some(serde_json::json!({"code": "CS101"}))
        );
    }
}
