//! 作业存储操作

use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{EduSystemError, Result};
use crate::models::assignments::{entities::Assignment, requests::NewAssignment};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_assignment_impl(&self, req: NewAssignment) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            created_by: Set(req.created_by),
            title: Set(req.title),
            description: Set(req.description),
            max_score: Set(req.max_score),
            deadline: Set(req.deadline.map(|d| d.timestamp())),
            ai_generated: Set(req.ai_generated),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    pub async fn list_course_assignments_impl(&self, course_id: i64) -> Result<Vec<Assignment>> {
        let models = Assignments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Deadline)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_assignment()).collect())
    }
}
