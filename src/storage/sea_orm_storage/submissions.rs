//! 提交存储操作

use super::{SeaOrmStorage, map_write_error};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{EduSystemError, Result};
use crate::models::submissions::entities::Submission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建提交
    ///
    /// (assignment_id, student_id) 唯一，重复提交返回 Conflict。
    pub async fn create_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
        content: &str,
    ) -> Result<Submission> {
        let model = ActiveModel {
            assignment_id: Set(assignment_id),
            student_id: Set(student_id),
            content: Set(content.to_string()),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, "创建提交失败"))?;

        Ok(result.into_submission())
    }

    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn get_student_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn list_submissions_impl(
        &self,
        assignment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>> {
        let mut select = Submissions::find().filter(Column::AssignmentId.eq(assignment_id));
        if let Some(student_id) = student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let models = select
            .order_by_asc(Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 评分
    pub async fn grade_submission_impl(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        if self.get_submission_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            score: Set(Some(score)),
            feedback: Set(feedback),
            graded_by: Set(Some(graded_by)),
            graded_at: Set(Some(chrono::Utc::now().timestamp())),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("评分失败: {e}")))?;

        Ok(Some(result.into_submission()))
    }
}
