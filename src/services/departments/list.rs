use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DepartmentService;
use crate::models::ApiError;
use crate::services::respond;

pub async fn list_departments(
    service: &DepartmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let storage = service.get_storage(request)?;
        storage.list_departments().await.map_err(ApiError::from)
    }
    .await;
    Ok(respond(result, "Departments retrieved successfully"))
}
