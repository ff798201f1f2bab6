use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiError, ApiResult,
    courses::{
        requests::{CourseListParams, CourseListQuery},
        responses::CourseListResponse,
    },
    users::entities::User,
};
use crate::services::{current_user, respond};
use crate::storage::Storage;

pub(crate) async fn list_courses_inner(
    storage: &dyn Storage,
    actor: &User,
    params: CourseListParams,
) -> ApiResult<CourseListResponse> {
    let (page, size) = params.pagination.normalized();
    let query = CourseListQuery {
        page,
        size,
        department_id: params.department_id,
        instructor_id: params.instructor_id,
        // 学生只能看到自己选的课
        student_id: actor.is_student().then_some(actor.id),
        search: params.search,
    };
    storage
        .list_courses_with_pagination(query)
        .await
        .map_err(ApiError::from)
}

pub async fn list_courses(
    service: &CourseService,
    params: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        list_courses_inner(storage.as_ref(), &actor, params).await
    }
    .await;
    Ok(respond(result, "Courses retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationQuery;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    fn params(search: Option<&str>) -> CourseListParams {
        CourseListParams {
            pagination: PaginationQuery::default(),
            department_id: None,
            instructor_id: None,
            search: search.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_students_only_see_enrolled_courses() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let enrolled = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        test_support::course(&storage, "CS102", dept.id, teacher.id, 3).await;
        storage.create_enrollment(enrolled.id, student.id).await.unwrap();

        let all = list_courses_inner(&storage, &teacher, params(None)).await.unwrap();
        assert_eq!(all.pagination.total, 2);

        let mine = list_courses_inner(&storage, &student, params(None)).await.unwrap();
        assert_eq!(mine.items.len(), 1);
        assert_eq!(mine.items[0].code, "CS101");

        let searched = list_courses_inner(&storage, &teacher, params(Some("102")))
            .await
            .unwrap();
        assert_eq!(searched.items.len(), 1);
    }
}
