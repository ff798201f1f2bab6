//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod audit_logs;
mod courses;
mod departments;
mod enrollments;
mod grades;
mod notifications;
mod quizzes;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{EduSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::migrate(&db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 内存 SQLite（单连接，连接关闭即丢失数据）
    pub async fn new_in_memory() -> Result<Self> {
        let db = Self::connect_sqlite("sqlite::memory:", 1, 5).await?;
        Self::migrate(&db).await?;
        Ok(Self { db })
    }

    async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None)
            .await
            .map_err(|e| EduSystemError::database_operation(format!("数据库迁移失败: {e}")))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EduSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存库的连接不能被回收，否则数据随之消失
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(pool_size.max(1))
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(timeout))
            .connect_with(opt)
            .await
            .map_err(|e| EduSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| EduSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EduSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 唯一约束冲突转换为 Conflict，其余为数据库操作错误
pub(crate) fn map_write_error(err: DbErr, context: &str) -> EduSystemError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            EduSystemError::conflict(format!("{context}: {detail}"))
        }
        _ => EduSystemError::database_operation(format!("{context}: {err}")),
    }
}

// Storage trait 实现
use crate::models::{
    assignments::{entities::Assignment, requests::NewAssignment},
    audit_logs::{
        entities::{AuditLog, NewAuditLog},
        requests::AuditLogListQuery,
        responses::AuditLogListResponse,
    },
    courses::{
        entities::{Course, StudyPlanWeek},
        requests::{CourseListQuery, NewCourse},
        responses::CourseListResponse,
    },
    departments::entities::Department,
    enrollments::entities::{Enrollment, EnrollmentStatus},
    grades::entities::{Grade, LetterGrade},
    notifications::{
        entities::{NewNotification, Notification},
        requests::NotificationListQuery,
        responses::NotificationListResponse,
    },
    quizzes::{
        entities::{Quiz, QuizAttempt},
        requests::NewQuiz,
    },
    submissions::entities::Submission,
    users::{entities::User, requests::NewUser},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        self.username_exists_impl(username).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        self.email_exists_impl(email).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        self.update_user_password_impl(id, password_hash).await
    }

    async fn update_user_department(&self, id: i64, department_id: Option<i64>) -> Result<bool> {
        self.update_user_department_impl(id, department_id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 院系模块
    async fn create_department(
        &self,
        name: &str,
        code: &str,
        head_id: Option<i64>,
    ) -> Result<Department> {
        self.create_department_impl(name, code, head_id).await
    }

    async fn get_department_by_id(&self, id: i64) -> Result<Option<Department>> {
        self.get_department_by_id_impl(id).await
    }

    async fn get_department_by_code(&self, code: &str) -> Result<Option<Department>> {
        self.get_department_by_code_impl(code).await
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        self.list_departments_impl().await
    }

    // 课程模块
    async fn create_course(&self, course: NewCourse) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        self.get_course_by_code_impl(code).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course_study_plan(
        &self,
        course_id: i64,
        weeks: &[StudyPlanWeek],
    ) -> Result<Option<Course>> {
        self.update_course_study_plan_impl(course_id, weeks).await
    }

    // 选课模块
    async fn create_enrollment(&self, course_id: i64, student_id: i64) -> Result<Enrollment> {
        self.create_enrollment_impl(course_id, student_id).await
    }

    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn get_enrollment(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<Enrollment>> {
        self.get_enrollment_impl(course_id, student_id).await
    }

    async fn list_course_enrollments(&self, course_id: i64) -> Result<Vec<Enrollment>> {
        self.list_course_enrollments_impl(course_id).await
    }

    async fn update_enrollment_status(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>> {
        self.update_enrollment_status_impl(id, status).await
    }

    async fn list_active_student_ids(&self, course_id: i64) -> Result<Vec<i64>> {
        self.list_active_student_ids_impl(course_id).await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_course_assignments(&self, course_id: i64) -> Result<Vec<Assignment>> {
        self.list_course_assignments_impl(course_id).await
    }

    // 提交模块
    async fn create_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        content: &str,
    ) -> Result<Submission> {
        self.create_submission_impl(assignment_id, student_id, content)
            .await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn get_student_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        self.get_student_submission_impl(assignment_id, student_id)
            .await
    }

    async fn list_submissions(
        &self,
        assignment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>> {
        self.list_submissions_impl(assignment_id, student_id).await
    }

    async fn grade_submission(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, score, feedback, graded_by)
            .await
    }

    // 测验模块
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        self.create_quiz_impl(quiz).await
    }

    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>> {
        self.get_quiz_by_id_impl(id).await
    }

    async fn list_course_quizzes(
        &self,
        course_id: i64,
        published_only: bool,
    ) -> Result<Vec<Quiz>> {
        self.list_course_quizzes_impl(course_id, published_only)
            .await
    }

    async fn set_quiz_published(&self, id: i64, published: bool) -> Result<Option<Quiz>> {
        self.set_quiz_published_impl(id, published).await
    }

    async fn create_quiz_attempt(
        &self,
        quiz_id: i64,
        student_id: i64,
        answers: &serde_json::Value,
        score: f64,
        max_score: f64,
    ) -> Result<QuizAttempt> {
        self.create_quiz_attempt_impl(quiz_id, student_id, answers, score, max_score)
            .await
    }

    async fn list_quiz_attempts(
        &self,
        quiz_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>> {
        self.list_quiz_attempts_impl(quiz_id, student_id).await
    }

    // 成绩模块
    async fn upsert_grade(
        &self,
        student_id: i64,
        course_id: i64,
        letter: LetterGrade,
        numeric: f64,
        comment: Option<String>,
        graded_by: i64,
    ) -> Result<Grade> {
        self.upsert_grade_impl(student_id, course_id, letter, numeric, comment, graded_by)
            .await
    }

    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<(Grade, Course)>> {
        self.list_student_grades_impl(student_id).await
    }

    async fn list_course_grades(&self, course_id: i64) -> Result<Vec<Grade>> {
        self.list_course_grades_impl(course_id).await
    }

    // 通知模块
    async fn create_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64> {
        self.create_notifications_impl(notifications).await
    }

    async fn get_notification_by_id(&self, id: i64) -> Result<Option<Notification>> {
        self.get_notification_by_id_impl(id).await
    }

    async fn list_user_notifications(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        self.list_user_notifications_impl(user_id, query).await
    }

    async fn count_unread_notifications(&self, user_id: i64) -> Result<i64> {
        self.count_unread_notifications_impl(user_id).await
    }

    async fn mark_notification_read(&self, id: i64, user_id: i64) -> Result<bool> {
        self.mark_notification_read_impl(id, user_id).await
    }

    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<i64> {
        self.mark_all_notifications_read_impl(user_id).await
    }

    // 审计日志模块
    async fn create_audit_log(&self, log: NewAuditLog) -> Result<AuditLog> {
        self.create_audit_log_impl(log).await
    }

    async fn list_audit_logs(&self, query: AuditLogListQuery) -> Result<AuditLogListResponse> {
        self.list_audit_logs_impl(query).await
    }

    async fn ping(&self) -> bool {
        self.db.execute_unprepared("SELECT 1").await.is_ok()
    }
}
