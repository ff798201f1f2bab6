use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::{
    ApiError, ApiResult, ErrorCode, submissions::entities::Submission, users::entities::User,
};
use crate::services::assignments::get::load_assignment;
use crate::services::{current_user, is_course_staff, is_enrolled, load_course, respond};
use crate::storage::Storage;

/// 课程负责人看到全部提交，学生只看到自己的
pub(crate) async fn list_submissions_inner(
    storage: &dyn Storage,
    actor: &User,
    assignment_id: i64,
) -> ApiResult<Vec<Submission>> {
    let assignment = load_assignment(storage, assignment_id).await?;
    let course = load_course(storage, assignment.course_id).await?;

    let student_filter = if is_course_staff(actor, &course) {
        None
    } else if actor.is_student() && is_enrolled(storage, course.id, actor.id, false).await? {
        Some(actor.id)
    } else {
        return Err(ApiError::forbidden(
            ErrorCode::CoursePermissionDenied,
            "You are not a member of this course",
        ));
    };

    Ok(storage
        .list_submissions(assignment.id, student_filter)
        .await?)
}

pub async fn list_submissions(
    service: &SubmissionService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        list_submissions_inner(storage.as_ref(), &actor, assignment_id).await
    }
    .await;
    Ok(respond(result, "Submissions retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::requests::NewAssignment;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_students_see_only_their_own() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let alice = test_support::user(&storage, "alice", UserRole::Student, None).await;
        let bob = test_support::user(&storage, "bob", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        for student in [&alice, &bob] {
            storage.create_enrollment(course.id, student.id).await.unwrap();
        }
        let assignment = storage
            .create_assignment(NewAssignment {
                course_id: course.id,
                created_by: teacher.id,
                title: "HW".into(),
                description: None,
                max_score: 10.0,
                deadline: None,
                ai_generated: false,
            })
            .await
            .unwrap();
        storage.create_submission(assignment.id, alice.id, "a").await.unwrap();
        storage.create_submission(assignment.id, bob.id, "b").await.unwrap();

        let all = list_submissions_inner(&storage, &teacher, assignment.id).await.unwrap();
        assert_eq!(all.len(), 2);
        let own = list_submissions_inner(&storage, &alice, assignment.id).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].student_id, alice.id);
    }
}
