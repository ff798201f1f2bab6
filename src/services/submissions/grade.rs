use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    notifications::entities::{NewNotification, NotificationKind},
    submissions::{entities::Submission, requests::GradeSubmissionRequest},
    users::entities::User,
};
use crate::services::assignments::get::load_assignment;
use crate::services::{current_user, ensure_course_staff, load_course, notify, respond};
use crate::storage::Storage;

pub(crate) async fn grade_submission_inner(
    storage: &dyn Storage,
    actor: &User,
    submission_id: i64,
    request: GradeSubmissionRequest,
) -> ApiResult<Submission> {
    let not_found =
        || ApiError::not_found(ErrorCode::SubmissionNotFound, "Submission not found");

    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(not_found)?;
    let assignment = load_assignment(storage, submission.assignment_id).await?;
    let course = load_course(storage, assignment.course_id).await?;
    ensure_course_staff(actor, &course)?;

    if !request.score.is_finite() || request.score < 0.0 || request.score > assignment.max_score {
        return Err(ApiError::bad_request(
            ErrorCode::ScoreOutOfRange,
            format!("Score must be between 0 and {}", assignment.max_score),
        ));
    }

    let feedback = request
        .feedback
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty());
    let graded = storage
        .grade_submission(submission.id, request.score, feedback, actor.id)
        .await?
        .ok_or_else(not_found)?;

    notify(
        storage,
        vec![
            NewNotification::new(
                graded.student_id,
                NotificationKind::SubmissionGraded,
                format!("{} has been graded", assignment.title),
            )
            .content(format!(
                "Score: {} / {}",
                request.score, assignment.max_score
            ))
            .reference("submission", graded.id),
        ],
    )
    .await;

    Ok(graded)
}

pub async fn grade_submission(
    service: &SubmissionService,
    submission_id: i64,
    data: GradeSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        grade_submission_inner(storage.as_ref(), &actor, submission_id, data).await
    }
    .await;
    Ok(respond(result, "Submission graded successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::requests::NewAssignment;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_grade_range_and_notification() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        let assignment = storage
            .create_assignment(NewAssignment {
                course_id: course.id,
                created_by: teacher.id,
                title: "HW".into(),
                description: None,
                max_score: 20.0,
                deadline: None,
                ai_generated: false,
            })
            .await
            .unwrap();
        let submission = storage
            .create_submission(assignment.id, student.id, "work")
            .await
            .unwrap();

        let err = grade_submission_inner(
            &storage,
            &teacher,
            submission.id,
            GradeSubmissionRequest {
                score: 25.0,
                feedback: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ScoreOutOfRange);

        let err = grade_submission_inner(
            &storage,
            &student,
            submission.id,
            GradeSubmissionRequest {
                score: 20.0,
                feedback: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::CoursePermissionDenied);

        let graded = grade_submission_inner(
            &storage,
            &teacher,
            submission.id,
            GradeSubmissionRequest {
                score: 18.5,
                feedback: Some("Good".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(graded.score, Some(18.5));
        assert_eq!(graded.graded_by, Some(teacher.id));
        assert_eq!(storage.count_unread_notifications(student.id).await.unwrap(), 1);
    }
}
