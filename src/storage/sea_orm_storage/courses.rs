//! 课程存储操作

use super::{SeaOrmStorage, map_write_error};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::errors::{EduSystemError, Result};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, StudyPlanWeek},
        requests::{CourseListQuery, NewCourse},
        responses::CourseListResponse,
    },
    enrollments::entities::EnrollmentStatus,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: NewCourse) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            department_id: Set(req.department_id),
            instructor_id: Set(req.instructor_id),
            code: Set(req.code),
            title: Set(req.title),
            description: Set(req.description),
            credits: Set(req.credits),
            study_plan: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, "创建课程失败"))?;

        Ok(result.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn get_course_by_code_impl(&self, code: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = Courses::find();

        if let Some(department_id) = query.department_id {
            select = select.filter(Column::DepartmentId.eq(department_id));
        }

        if let Some(instructor_id) = query.instructor_id {
            select = select.filter(Column::InstructorId.eq(instructor_id));
        }

        // 学生只看到自己选过（未退课）的课程
        if let Some(student_id) = query.student_id {
            let course_ids: Vec<i64> = Enrollments::find()
                .select_only()
                .column(EnrollmentColumn::CourseId)
                .filter(EnrollmentColumn::StudentId.eq(student_id))
                .filter(EnrollmentColumn::Status.ne(EnrollmentStatus::Dropped.to_string()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| {
                    EduSystemError::database_operation(format!("查询选课记录失败: {e}"))
                })?;
            select = select.filter(Column::Id.is_in(course_ids));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Code.contains(&escaped))
                    .add(Column::Title.contains(&escaped)),
            );
        }

        select = select.order_by_asc(Column::Code);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询课程总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询课程页数失败: {e}")))?;

        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(CourseListResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 保存学习计划
    pub async fn update_course_study_plan_impl(
        &self,
        course_id: i64,
        weeks: &[StudyPlanWeek],
    ) -> Result<Option<Course>> {
        if Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询课程失败: {e}")))?
            .is_none()
        {
            return Ok(None);
        }

        let plan_json = serde_json::to_string(weeks)?;
        let model = ActiveModel {
            id: Set(course_id),
            study_plan: Set(Some(plan_json)),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("保存学习计划失败: {e}")))?;

        Ok(Some(result.into_course()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::errors::EduSystemError;
    use crate::models::courses::{
        entities::StudyPlanWeek,
        requests::{CourseListQuery, NewCourse},
    };
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_duplicate_course_code_rejected() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;

        let err = storage
            .create_course(NewCourse {
                department_id: dept.id,
                instructor_id: teacher.id,
                code: "CS101".into(),
                title: "Duplicate".into(),
                description: None,
                credits: 4,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EduSystemError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_student_sees_only_enrolled_courses() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, Some(dept.id)).await;
        let c1 = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        test_support::course(&storage, "CS102", dept.id, teacher.id, 3).await;
        storage.create_enrollment(c1.id, student.id).await.unwrap();

        let all = storage
            .list_courses_with_pagination(CourseListQuery {
                page: 1,
                size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);

        let mine = storage
            .list_courses_with_pagination(CourseListQuery {
                page: 1,
                size: 10,
                student_id: Some(student.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.items.len(), 1);
        assert_eq!(mine.items[0].code, "CS101");
    }

    #[tokio::test]
    async fn test_study_plan_persisted() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;
        assert!(course.study_plan.is_empty());

        let weeks = vec![StudyPlanWeek::empty(1), StudyPlanWeek::empty(2)];
        let updated = storage
            .update_course_study_plan(course.id, &weeks)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.study_plan, weeks);

        assert!(
            storage
                .update_course_study_plan(9999, &weeks)
                .await
                .unwrap()
                .is_none()
        );
    }
}
