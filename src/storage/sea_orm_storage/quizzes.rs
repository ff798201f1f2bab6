//! 测验与作答存储操作

use super::SeaOrmStorage;
use crate::entity::quiz_attempts::{
    ActiveModel as AttemptActiveModel, Column as AttemptColumn, Entity as QuizAttempts,
};
use crate::entity::quizzes::{ActiveModel, Column, Entity as Quizzes};
use crate::errors::{EduSystemError, Result};
use crate::models::quizzes::{
    entities::{Quiz, QuizAttempt},
    requests::NewQuiz,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_quiz_impl(&self, req: NewQuiz) -> Result<Quiz> {
        let now = chrono::Utc::now().timestamp();
        let questions = serde_json::to_string(&req.questions)?;

        let model = ActiveModel {
            course_id: Set(req.course_id),
            created_by: Set(req.created_by),
            title: Set(req.title),
            description: Set(req.description),
            questions: Set(questions),
            time_limit_minutes: Set(req.time_limit_minutes),
            published: Set(false),
            ai_generated: Set(req.ai_generated),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("创建测验失败: {e}")))?;

        Ok(result.into_quiz())
    }

    pub async fn get_quiz_by_id_impl(&self, id: i64) -> Result<Option<Quiz>> {
        let result = Quizzes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_quiz()))
    }

    pub async fn list_course_quizzes_impl(
        &self,
        course_id: i64,
        published_only: bool,
    ) -> Result<Vec<Quiz>> {
        let mut select = Quizzes::find().filter(Column::CourseId.eq(course_id));
        if published_only {
            select = select.filter(Column::Published.eq(true));
        }

        let models = select
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询测验列表失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_quiz()).collect())
    }

    pub async fn set_quiz_published_impl(&self, id: i64, published: bool) -> Result<Option<Quiz>> {
        if self.get_quiz_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            published: Set(published),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("更新测验失败: {e}")))?;

        Ok(Some(result.into_quiz()))
    }

    pub async fn create_quiz_attempt_impl(
        &self,
        quiz_id: i64,
        student_id: i64,
        answers: &serde_json::Value,
        score: f64,
        max_score: f64,
    ) -> Result<QuizAttempt> {
        let model = AttemptActiveModel {
            quiz_id: Set(quiz_id),
            student_id: Set(student_id),
            answers: Set(answers.to_string()),
            score: Set(score),
            max_score: Set(max_score),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("保存作答失败: {e}")))?;

        Ok(result.into_attempt())
    }

    pub async fn list_quiz_attempts_impl(
        &self,
        quiz_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>> {
        let mut select = QuizAttempts::find().filter(AttemptColumn::QuizId.eq(quiz_id));
        if let Some(student_id) = student_id {
            select = select.filter(AttemptColumn::StudentId.eq(student_id));
        }

        let models = select
            .order_by_desc(AttemptColumn::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("查询作答记录失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_attempt()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::models::quizzes::{entities::QuizQuestion, requests::NewQuiz};
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_quiz_publish_and_attempts() {
        let storage = test_support::storage().await;
        let dept = test_support::department(&storage, "CS").await;
        let teacher = test_support::user(&storage, "t1", UserRole::Teacher, Some(dept.id)).await;
        let student = test_support::user(&storage, "s1", UserRole::Student, Some(dept.id)).await;
        let course = test_support::course(&storage, "CS101", dept.id, teacher.id, 3).await;

        let quiz = storage
            .create_quiz(NewQuiz {
                course_id: course.id,
                created_by: teacher.id,
                title: "Week 1".into(),
                description: None,
                questions: vec![QuizQuestion {
                    question: "1+1?".into(),
                    options: vec!["1".into(), "2".into()],
                    correct_answer: "B".into(),
                    points: 1.0,
                    explanation: None,
                }],
                time_limit_minutes: Some(10),
                ai_generated: false,
            })
            .await
            .unwrap();
        assert!(!quiz.published);
        assert_eq!(quiz.questions.len(), 1);

        assert!(
            storage
                .list_course_quizzes(course.id, true)
                .await
                .unwrap()
                .is_empty()
        );
        storage.set_quiz_published(quiz.id, true).await.unwrap();
        assert_eq!(
            storage.list_course_quizzes(course.id, true).await.unwrap().len(),
            1
        );

        let answers = serde_json::json!(["B"]);
        let attempt = storage
            .create_quiz_attempt(quiz.id, student.id, &answers, 1.0, 1.0)
            .await
            .unwrap();
        assert_eq!(attempt.answers, answers);

        let mine = storage
            .list_quiz_attempts(quiz.id, Some(student.id))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert!(
            storage
                .list_quiz_attempts(quiz.id, Some(teacher.id))
                .await
                .unwrap()
                .is_empty()
        );
    }
}
