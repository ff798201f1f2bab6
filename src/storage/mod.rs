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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: NewUser) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 用户名是否已存在
    async fn username_exists(&self, username: &str) -> Result<bool>;
    // 邮箱是否已存在
    async fn email_exists(&self, email: &str) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 更新密码哈希
    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool>;
    // 调整用户所属院系
    async fn update_user_department(&self, id: i64, department_id: Option<i64>) -> Result<bool>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;

    /// 院系管理方法
    async fn create_department(
        &self,
        name: &str,
        code: &str,
        head_id: Option<i64>,
    ) -> Result<Department>;
    async fn get_department_by_id(&self, id: i64) -> Result<Option<Department>>;
    async fn get_department_by_code(&self, code: &str) -> Result<Option<Department>>;
    async fn list_departments(&self) -> Result<Vec<Department>>;

    /// 课程管理方法
    async fn create_course(&self, course: NewCourse) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn get_course_by_code(&self, code: &str) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    // 保存学习计划（周列表已规范化）
    async fn update_course_study_plan(
        &self,
        course_id: i64,
        weeks: &[StudyPlanWeek],
    ) -> Result<Option<Course>>;

    /// 选课管理方法
    async fn create_enrollment(&self, course_id: i64, student_id: i64) -> Result<Enrollment>;
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    async fn get_enrollment(&self, course_id: i64, student_id: i64)
    -> Result<Option<Enrollment>>;
    async fn list_course_enrollments(&self, course_id: i64) -> Result<Vec<Enrollment>>;
    async fn update_enrollment_status(
        &self,
        id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>>;
    // 在读学生 ID
    async fn list_active_student_ids(&self, course_id: i64) -> Result<Vec<i64>>;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_course_assignments(&self, course_id: i64) -> Result<Vec<Assignment>>;

    /// 提交管理方法
    async fn create_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
        content: &str,
    ) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    async fn get_student_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;
    async fn list_submissions(
        &self,
        assignment_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>>;
    async fn grade_submission(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        graded_by: i64,
    ) -> Result<Option<Submission>>;

    /// 测验管理方法
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz>;
    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>>;
    async fn list_course_quizzes(&self, course_id: i64, published_only: bool)
    -> Result<Vec<Quiz>>;
    async fn set_quiz_published(&self, id: i64, published: bool) -> Result<Option<Quiz>>;
    async fn create_quiz_attempt(
        &self,
        quiz_id: i64,
        student_id: i64,
        answers: &serde_json::Value,
        score: f64,
        max_score: f64,
    ) -> Result<QuizAttempt>;
    async fn list_quiz_attempts(
        &self,
        quiz_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>>;

    /// 成绩管理方法
    // 每个学生每门课只有一条成绩，已存在时覆盖
    async fn upsert_grade(
        &self,
        student_id: i64,
        course_id: i64,
        letter: LetterGrade,
        numeric: f64,
        comment: Option<String>,
        graded_by: i64,
    ) -> Result<Grade>;
    async fn list_student_grades(&self, student_id: i64) -> Result<Vec<(Grade, Course)>>;
    async fn list_course_grades(&self, course_id: i64) -> Result<Vec<Grade>>;

    /// 通知管理方法
    async fn create_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64>;
    async fn get_notification_by_id(&self, id: i64) -> Result<Option<Notification>>;
    async fn list_user_notifications(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse>;
    async fn count_unread_notifications(&self, user_id: i64) -> Result<i64>;
    async fn mark_notification_read(&self, id: i64, user_id: i64) -> Result<bool>;
    async fn mark_all_notifications_read(&self, user_id: i64) -> Result<i64>;

    /// 审计日志方法
    async fn create_audit_log(&self, log: NewAuditLog) -> Result<AuditLog>;
    async fn list_audit_logs(&self, query: AuditLogListQuery) -> Result<AuditLogListResponse>;

    /// 数据库连通性检查
    async fn ping(&self) -> bool;
}
