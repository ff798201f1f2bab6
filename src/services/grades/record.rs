use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    audit_logs::entities::{NewAuditLog, actions},
    grades::{
        entities::{Grade, LetterGrade},
        requests::RecordGradeRequest,
    },
    notifications::entities::{NewNotification, NotificationKind},
    users::entities::User,
};
use crate::services::{
    audit, current_user, ensure_course_staff, is_enrolled, load_course, notify, respond,
};
use crate::storage::Storage;

fn invalid(message: impl Into<String>) -> ApiError {
    ApiError::bad_request(ErrorCode::GradeInvalid, message)
}

/// 确定等级与百分制分数
///
/// 只给分数时按分数换算等级；只给等级时分数取该等级下限。
/// 两者都给时必须一致，GPA 按等级计算。
pub(crate) fn resolve_grade(
    numeric: Option<f64>,
    letter: Option<&str>,
) -> ApiResult<(LetterGrade, f64)> {
    if let Some(score) = numeric
        && (!score.is_finite() || !(0.0..=100.0).contains(&score))
    {
        return Err(invalid("Numeric grade must be between 0 and 100"));
    }

    let letter = match letter.map(str::trim).filter(|l| !l.is_empty()) {
        Some(raw) => Some(raw.parse::<LetterGrade>().map_err(invalid)?),
        None => None,
    };

    match (letter, numeric) {
        (Some(letter), Some(score)) => {
            let expected = LetterGrade::from_numeric(score);
            if expected != letter {
                return Err(invalid(format!(
                    "Letter grade {} does not match numeric grade {score} ({})",
                    letter.as_str(),
                    expected.as_str()
                )));
            }
            Ok((letter, score))
        }
        (Some(letter), None) => Ok((letter, letter.min_numeric())),
        (None, Some(score)) => Ok((LetterGrade::from_numeric(score), score)),
        (None, None) => Err(invalid("Either a numeric grade or a letter grade is required")),
    }
}

pub(crate) async fn record_grade_inner(
    storage: &dyn Storage,
    actor: &User,
    request: RecordGradeRequest,
) -> ApiResult<Grade> {
    let course = load_course(storage, request.course_id).await?;
    ensure_course_staff(actor, &course)?;

    let student = storage
        .get_user_by_id(request.student_id)
        .await?
        .filter(|u| u.is_student())
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "Student not found"))?;
    if !is_enrolled(storage, course.id, student.id, false).await? {
        return Err(ApiError::bad_request(
            ErrorCode::NotEnrolled,
            "Student is not enrolled in this course",
        ));
    }

    let (letter, numeric) = resolve_grade(request.numeric, request.letter.as_deref())?;
    let comment = request
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let grade = storage
        .upsert_grade(student.id, course.id, letter, numeric, comment, actor.id)
        .await?;

    notify(
        storage,
        vec![
            NewNotification::new(
                student.id,
                NotificationKind::GradeRecorded,
                format!("Final grade posted for {}", course.code),
            )
            .content(format!("Your grade for {} is {}.", course.title, letter))
            .reference("course", course.id),
        ],
    )
    .await;

    audit(
        storage,
        NewAuditLog::new(actor.id, actions::GRADE_RECORD, "grade", Some(grade.id)).details(
            serde_json::json!({
                "student_id": student.id,
                "course_id": course.id,
                "letter": letter.as_str(),
                "numeric": numeric,
            }),
        ),
    )
    .await;

    Ok(grade)
}

pub async fn record_grade(
    service: &GradeService,
    data: RecordGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        record_grade_inner(storage.as_ref(), &actor, data).await
    }
    .await;
    Ok(respond(result, "Grade recorded successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[test]
    fn test_resolve_grade() {
        assert_eq!(resolve_grade(Some(91.0), None).unwrap(), (LetterGrade::AMinus, 91.0));
        assert_eq!(resolve_grade(None, Some("b+")).unwrap(), (LetterGrade::BPlus, 87.0));
        assert_eq!(
            resolve_grade(Some(94.5), Some("A")).unwrap(),
            (LetterGrade::A, 94.5)
        );
        // 等级与分数矛盾
        let err = resolve_grade(Some(10.0), Some("A+")).unwrap_err();
        assert_eq!(err.code, ErrorCode::GradeInvalid);
        assert!(resolve_grade(Some(92.9), Some("A")).is_err());
        assert!(resolve_grade(None, None).is_err());
        assert!(resolve_grade(Some(101.0), None).is_err());
        let err = resolve_grade(None, Some("E")).unwrap_err();
        assert_eq!(err.code, ErrorCode::GradeInvalid);
    }

    #[tokio::test]
    async fn test_record_grade_upserts() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let stranger = test_support::user(&storage, "s2", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        storage.create_enrollment(course.id, student.id).await.unwrap();

        let request = |student_id, numeric| RecordGradeRequest {
            student_id,
            course_id: course.id,
            numeric: Some(numeric),
            letter: None,
            comment: None,
        };

        let first = record_grade_inner(&storage, &teacher, request(student.id, 78.0))
            .await
            .unwrap();
        assert_eq!(first.letter, LetterGrade::CPlus);
        let second = record_grade_inner(&storage, &teacher, request(student.id, 95.0))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.letter, LetterGrade::A);
        assert_eq!(storage.list_course_grades(course.id).await.unwrap().len(), 1);

        let err = record_grade_inner(&storage, &teacher, request(stranger.id, 80.0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotEnrolled);

        let err = record_grade_inner(&storage, &student, request(student.id, 100.0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CoursePermissionDenied);
    }
}
