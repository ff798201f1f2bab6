//! 院系存储操作

use super::{SeaOrmStorage, map_write_error};
use crate::entity::departments::{ActiveModel, Column, Entity as Departments};
use crate::errors::{EduSystemError, Result};
use crate::models::departments::entities::Department;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_department_impl(
        &self,
        name: &str,
        code: &str,
        head_id: Option<i64>,
    ) -> Result<Department> {
        let model = ActiveModel {
            name: Set(name.to_string()),
            code: Set(code.to_string()),
            head_id: Set(head_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, "创建院系失败"))?;

        Ok(result.into_department())
    }

    pub async fn get_department_by_id_impl(&self, id: i64) -> Result<Option<Department>> {
        let result = Departments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询院系失败: {e}")))?;

        Ok(result.map(|m| m.into_department()))
    }

    pub async fn get_department_by_code_impl(&self, code: &str) -> Result<Option<Department>> {
        let result = Departments::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询院系失败: {e}")))?;

        Ok(result.map(|m| m.into_department()))
    }

    pub async fn list_departments_impl(&self) -> Result<Vec<Department>> {
        let models = Departments::find()
            .order_by_asc(Column::Code)
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询院系列表失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_department()).collect())
    }
}
