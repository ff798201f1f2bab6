use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::ai::normalize::normalize_study_plan;
use crate::config::AppConfig;
use crate::models::{
    ApiError, ApiResult, ErrorCode,
    audit_logs::entities::{NewAuditLog, actions},
    courses::{
        entities::{Course, StudyPlanWeek},
        requests::UpdateStudyPlanRequest,
        responses::StudyPlanResponse,
    },
    notifications::entities::{NewNotification, NotificationKind},
    users::entities::User,
};
use crate::services::{
    audit, current_user, ensure_course_member, ensure_course_staff, load_course, notify, respond,
};
use crate::storage::Storage;

/// 保存学习计划并通知在读学生
///
/// 手动编写与 AI 生成共用。
pub(crate) async fn publish_study_plan(
    storage: &dyn Storage,
    actor: &User,
    course: &Course,
    weeks: &[StudyPlanWeek],
    source: &str,
) -> ApiResult<Course> {
    let updated = storage
        .update_course_study_plan(course.id, weeks)
        .await?
        .ok_or_else(|| ApiError::not_found(ErrorCode::CourseNotFound, "Course not found"))?;

    let student_ids = storage.list_active_student_ids(course.id).await?;
    let notifications = student_ids
        .into_iter()
        .map(|student_id| {
            NewNotification::new(
                student_id,
                NotificationKind::StudyPlanPublished,
                format!("Study plan updated for {}", course.code),
            )
            .content(format!("{} now has a {}-week study plan.", course.title, weeks.len()))
            .reference("course", course.id)
        })
        .collect();
    notify(storage, notifications).await;

    audit(
        storage,
        NewAuditLog::new(actor.id, actions::STUDY_PLAN_UPDATE, "course", Some(course.id))
            .details(serde_json::json!({ "weeks": weeks.len(), "source": source })),
    )
    .await;

    Ok(updated)
}

pub(crate) async fn get_study_plan_inner(
    storage: &dyn Storage,
    actor: &User,
    course_id: i64,
) -> ApiResult<StudyPlanResponse> {
    let course = load_course(storage, course_id).await?;
    ensure_course_member(storage, actor, &course).await?;
    Ok(StudyPlanResponse {
        course_id: course.id,
        weeks: course.study_plan,
    })
}

pub(crate) async fn update_study_plan_inner(
    storage: &dyn Storage,
    actor: &User,
    course_id: i64,
    request: UpdateStudyPlanRequest,
) -> ApiResult<StudyPlanResponse> {
    let course = load_course(storage, course_id).await?;
    ensure_course_staff(actor, &course)?;

    let weeks = normalize_study_plan(&request.weeks).ok_or_else(|| {
        ApiError::bad_request(
            ErrorCode::StudyPlanInvalid,
            "Study plan must be a list of weeks",
        )
    })?;
    let max_weeks = AppConfig::get().ai.max_weeks as usize;
    if weeks.is_empty() || weeks.len() > max_weeks {
        return Err(ApiError::bad_request(
            ErrorCode::StudyPlanInvalid,
            format!("Study plan must have between 1 and {max_weeks} weeks"),
        ));
    }

    let updated = publish_study_plan(storage, actor, &course, &weeks, "manual").await?;
    Ok(StudyPlanResponse {
        course_id: updated.id,
        weeks: updated.study_plan,
    })
}

pub async fn get_study_plan(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        get_study_plan_inner(storage.as_ref(), &actor, course_id).await
    }
    .await;
    Ok(respond(result, "Study plan retrieved successfully"))
}

pub async fn update_study_plan(
    service: &CourseService,
    course_id: i64,
    data: UpdateStudyPlanRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_user(request)?;
        let storage = service.get_storage(request)?;
        update_study_plan_inner(storage.as_ref(), &actor, course_id, data).await
    }
    .await;
    Ok(respond(result, "Study plan saved successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support;
    use serde_json::json;

    #[tokio::test]
    async fn test_manual_plan_is_backfilled_and_announced() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, None).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        storage.create_enrollment(course.id, student.id).await.unwrap();

        let plan = update_study_plan_inner(
            &storage,
            &teacher,
            course.id,
            UpdateStudyPlanRequest {
                weeks: json!({"weeks": [{"title": "Intro", "topics": "Syllabus"}, {"week": 2}]}),
            },
        )
        .await
        .unwrap();
        assert_eq!(plan.weeks.len(), 2);
        assert_eq!(plan.weeks[0].topics, vec!["Syllabus".to_string()]);
        assert_eq!(plan.weeks[1].title, "Week 2");
        assert!(plan.weeks[1].readings.is_empty());

        let seen = get_study_plan_inner(&storage, &student, course.id).await.unwrap();
        assert_eq!(seen.weeks, plan.weeks);

        let inbox = storage
            .list_user_notifications(
                student.id,
                NotificationListQuery {
                    page: 1,
                    size: 10,
                    unread_only: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(inbox.items.len(), 1);
        assert_eq!(inbox.items[0].kind, NotificationKind::StudyPlanPublished);

        // 学生不能修改
        let err = update_study_plan_inner(
            &storage,
            &student,
            course.id,
            UpdateStudyPlanRequest { weeks: json!([]) },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::CoursePermissionDenied);

        let err = update_study_plan_inner(
            &storage,
            &teacher,
            course.id,
            UpdateStudyPlanRequest { weeks: json!(42) },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::StudyPlanInvalid);
    }
}
