//! 成绩存储操作

use super::{SeaOrmStorage, map_write_error};
use crate::entity::courses::Entity as Courses;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::errors::{EduSystemError, Result};
use crate::models::{
    courses::entities::Course,
    grades::entities::{Grade, LetterGrade},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 记录成绩（同一学生同一课程覆盖旧记录）
    pub async fn upsert_grade_impl(
        &self,
        student_id: i64,
        course_id: i64,
        letter: LetterGrade,
        numeric: f64,
        comment: Option<String>,
        graded_by: i64,
    ) -> Result<Grade> {
        let now = chrono::Utc::now().timestamp();

        let existing = Grades::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询成绩失败: {e}")))?;

        let result = match existing {
            Some(model) => {
                let mut active: ActiveModel = model.into();
                active.letter = Set(letter.to_string());
                active.numeric = Set(numeric);
                active.comment = Set(comment);
                active.graded_by = Set(graded_by);
                active.updated_at = Set(now);
                active
                    .update(&self.db)
                    .await
                    .map_err(|e| EduSystemError::database_operation(format!("更新成绩失败: {e}")))?
            }
            None => {
                let active = ActiveModel {
                    student_id: Set(student_id),
                    course_id: Set(course_id),
                    letter: Set(letter.to_string()),
                    numeric: Set(numeric),
                    comment: Set(comment),
                    graded_by: Set(graded_by),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active
                    .insert(&self.db)
                    .await
                    .map_err(|e| map_write_error(e, "记录成绩失败"))?
            }
        };

        Ok(result.into_grade())
    }

    /// 学生的全部成绩及对应课程
    pub async fn list_student_grades_impl(&self, student_id: i64) -> Result<Vec<(Grade, Course)>> {
        let rows = Grades::find()
            .filter(Column::StudentId.eq(student_id))
            .find_also_related(Courses)
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询学生成绩失败: {e}")))?;

        // 课程被删除时成绩随之级联删除，这里跳过不一致的数据
        Ok(rows
            .into_iter()
            .filter_map(|(grade, course)| {
                course.map(|course| (grade.into_grade(), course.into_course()))
            })
            .collect())
    }

    pub async fn list_course_grades_impl(&self, course_id: i64) -> Result<Vec<Grade>> {
        let models = Grades::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询课程成绩失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_grade()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::models::grades::entities::LetterGrade;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_upsert_overwrites_existing_grade() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "MATH").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, Some(dept.id)).await;
        let course = test_support::course(&storage, "MATH201", dept.id, teacher.id, 4).await;

        let first = storage
            .upsert_grade(student.id, course.id, LetterGrade::B, 84.0, None, teacher.id)
            .await
            .unwrap();
        let second = storage
            .upsert_grade(
                student.id,
                course.id,
                LetterGrade::A,
                95.0,
                Some("regrade".into()),
                teacher.id,
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.letter, LetterGrade::A);
        assert_eq!(second.comment.as_deref(), Some("regrade"));
        assert_eq!(storage.list_course_grades(course.id).await.unwrap().len(), 1);

        let rows = storage.list_student_grades(student.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.credits, 4);
    }
}
