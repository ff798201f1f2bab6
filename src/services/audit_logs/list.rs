use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AuditLogService;
use crate::models::{
    ApiError, ApiResult,
    audit_logs::{
        requests::{AuditLogListParams, AuditLogListQuery},
        responses::AuditLogListResponse,
    },
};
use crate::services::respond;
use crate::storage::Storage;

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// 审计日志查询，路由层限定管理员与主管教师
pub(crate) async fn list_audit_logs_inner(
    storage: &dyn Storage,
    params: AuditLogListParams,
) -> ApiResult<AuditLogListResponse> {
    let (page, size) = params.pagination.normalized();
    let query = AuditLogListQuery {
        page,
        size,
        actor_id: params.actor_id,
        action: non_empty(params.action),
        entity_type: non_empty(params.entity_type),
    };
    storage.list_audit_logs(query).await.map_err(ApiError::from)
}

pub async fn list_audit_logs(
    service: &AuditLogService,
    params: AuditLogListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let storage = service.get_storage(request)?;
        list_audit_logs_inner(storage.as_ref(), params).await
    }
    .await;
    Ok(respond(result, "Audit logs retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationQuery;
    use crate::models::audit_logs::entities::{NewAuditLog, actions};
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_filter_by_action() {
        let storage = test_support::storage().await;
        let admin = test_support::user(&storage, "root", UserRole::Admin, None).await;
        for (action, entity) in [
            (actions::USER_CREATE, "user"),
            (actions::COURSE_CREATE, "course"),
            (actions::USER_CREATE, "user"),
        ] {
            storage
                .create_audit_log(NewAuditLog::new(admin.id, action, entity, Some(1)))
                .await
                .unwrap();
        }

        let params = AuditLogListParams {
            pagination: PaginationQuery::default(),
            actor_id: Some(admin.id),
            action: Some(format!(" {} ", actions::USER_CREATE)),
            entity_type: Some(String::new()),
        };
        let page = list_audit_logs_inner(&storage, params).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert!(page.items.iter().all(|l| l.action == actions::USER_CREATE));
    }
}
