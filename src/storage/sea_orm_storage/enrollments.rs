//! 选课存储操作

use super::{SeaOrmStorage, map_write_error};
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::errors::{EduSystemError, Result};
use crate::models::enrollments::entities::{Enrollment, EnrollmentStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    pub async fn create_enrollment_impl(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Enrollment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(course_id),
            student_id: Set(student_id),
            status: Set(EnrollmentStatus::Active.to_string()),
            enrolled_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, "创建选课记录失败"))?;

        Ok(result.into_enrollment())
    }

    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn get_enrollment_impl(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn list_course_enrollments_impl(&self, course_id: i64) -> Result<Vec<Enrollment>> {
        let models = Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询选课列表失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_enrollment()).collect())
    }

    pub async fn update_enrollment_status_impl(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>> {
        if self.get_enrollment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            status: Set(status.to_string()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("更新选课状态失败: {e}")))?;

        Ok(Some(result.into_enrollment()))
    }

    pub async fn list_active_student_ids_impl(&self, course_id: i64) -> Result<Vec<i64>> {
        Enrollments::find()
            .select_only()
            .column(Column::StudentId)
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.eq(EnrollmentStatus::Active.to_string()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询在读学生失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::errors::EduSystemError;
    use crate::models::enrollments::entities::EnrollmentStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_enrollment_lifecycle() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let s1 = test_support::user(&storage, "s1", UserRole::Student, Some(dept.id)).await;
        let s2 = test_support::user(&storage, "s2", UserRole::Student, Some(dept.id)).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;

        let e1 = storage.create_enrollment(course.id, s1.id).await.unwrap();
        storage.create_enrollment(course.id, s2.id).await.unwrap();

        let dup = storage.create_enrollment(course.id, s1.id).await.unwrap_err();
        assert!(matches!(dup, EduSystemError::Conflict(_)));

        storage
            .update_enrollment_status(e1.id, EnrollmentStatus::Dropped)
            .await
            .unwrap()
            .unwrap();

        let active = storage.list_active_student_ids(course.id).await.unwrap();
        assert_eq!(active, vec![s2.id]);
        assert_eq!(
            storage.list_course_enrollments(course.id).await.unwrap().len(),
            2
        );
    }
}
