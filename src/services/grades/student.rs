use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use super::gpa::compute_gpa;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    grades::responses::{CourseGrade, StudentGradesResponse},
    users::entities::User,
};
use crate::services::{current_user, is_course_staff, respond};
use crate::storage::Storage;

/// 学生成绩与 GPA
///
/// 本人、管理员与学生所在院系的主管教师看到全部成绩；
/// 课程负责人只看到自己负责的课程，GPA 也只按这些课程计算。
pub(crate) async fn student_grades_inner(
    storage: &dyn Storage,
    actor: &User,
    student_id: i64,
) -> ApiResult<StudentGradesResponse> {
    let student = storage
        .get_user_by_id(student_id)
        .await?
        .filter(|u| u.is_student())
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "Student not found"))?;

    let full_access = actor.id == student.id
        || actor.is_admin()
        || student
            .department_id
            .is_some_and(|dept| actor.supervises(dept));

    let grades: Vec<CourseGrade> = storage
        .list_student_grades(student.id)
        .await?
        .into_iter()
        .filter(|(_, course)| full_access || is_course_staff(actor, course))
        .map(|(grade, course)| CourseGrade {
            grade,
            course_code: course.code,
            course_title: course.title,
            credits: course.credits,
        })
        .collect();

    if !full_access && grades.is_empty() {
        return Err(ApiError::forbidden(
            ErrorCode::Forbidden,
            "You are not allowed to view this student's grades",
        ));
    }

    let gpa = compute_gpa(grades.iter().map(|g| (g.grade.letter, g.credits)));
    let total_credits = grades.iter().map(|g| g.credits.max(0)).sum();

    Ok(StudentGradesResponse {
        student_id: student.id,
        grades,
        total_credits,
        gpa,
    })
}

pub async fn student_grades(
    service: &GradeService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        student_grades_inner(storage.as_ref(), &actor, student_id).await
    }
    .await;
    Ok(respond(result, "Grades retrieved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::LetterGrade;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_gpa_and_visibility() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let t1 = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let t2 = test_support::user(&storage, "t2", UserRole::Teacher, Some(dept.id)).await;
        let t3 = test_support::user(&storage, "t3", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let peer = test_support::user(&storage, "s2", UserRole::Student, None).await;
        let c1 = test_support::course(&storage, "CS101", dept.id, t1.id, 4).await;
        let c2 = test_support::course(&storage, "CS102", dept.id, t2.id, 2).await;

        storage
            .upsert_grade(student.id, c1.id, LetterGrade::A, 95.0, None, t1.id)
            .await
            .unwrap();
        storage
            .upsert_grade(student.id, c2.id, LetterGrade::BMinus, 81.0, None, t2.id)
            .await
            .unwrap();

        // (4.0*4 + 2.7*2) / 6 = 3.5666..
        let own = student_grades_inner(&storage, &student, student.id).await.unwrap();
        assert_eq!(own.grades.len(), 2);
        assert_eq!(own.total_credits, 6);
        assert_eq!(own.gpa, 3.57);

        let partial = student_grades_inner(&storage, &t2, student.id).await.unwrap();
        assert_eq!(partial.grades.len(), 1);
        assert_eq!(partial.gpa, 2.7);

        assert!(student_grades_inner(&storage, &t3, student.id).await.is_err());
        assert!(student_grades_inner(&storage, &peer, student.id).await.is_err());
    }
}
