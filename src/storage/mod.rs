use std::sync::Arc;

use crate::models::{
    assignments::{entities::Assignment, requests::NewAssignment},
    class_members::entities::ClassMember,
    classes::{entities::Class, requests::NewClass},
    files::{entities::StoredFile, requests::NewStoredFile},
    submissions::{
        entities::Submission,
        requests::{NewSubmission, SubmissionReview},
    },
    users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户，邮箱重复时返回 Conflict
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息（邮箱需已规范化为小写）
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 列出拥有某角色的用户
    async fn list_users_with_role(&self, role: UserRole) -> Result<Vec<User>>;
    // 追加角色，name 非空时同时更新姓名
    async fn add_user_role(
        &self,
        id: i64,
        role: UserRole,
        name: Option<String>,
    ) -> Result<Option<User>>;
    // 更新密码哈希
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 密码重置方法
    // 写入新的验证码哈希，重置尝试次数并清除旧的重置令牌
    async fn set_reset_code(&self, id: i64, code_hash: &str, expires_at: i64) -> Result<bool>;
    // 尝试次数从 expected 加一，并发冲突时返回 false
    async fn consume_reset_attempt(&self, id: i64, expected_tries: i32) -> Result<bool>;
    // 验证通过后写入重置令牌并清除验证码
    async fn set_reset_token(&self, id: i64, token: &str, expires_at: i64) -> Result<bool>;
    // 通过重置令牌获取用户
    async fn get_user_by_reset_token(&self, token: &str) -> Result<Option<User>>;
    // 更新密码并清除所有重置状态
    async fn complete_password_reset(&self, id: i64, password_hash: &str) -> Result<bool>;

    /// 班级管理方法
    // 创建班级，加入码重复时返回 Conflict
    async fn create_class(&self, class: NewClass) -> Result<Class>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 通过加入码获取班级信息
    async fn get_class_by_code(&self, code: &str) -> Result<Option<Class>>;
    // 列出教师创建的班级
    async fn list_classes_by_teacher(&self, teacher_id: i64) -> Result<Vec<Class>>;
    // 列出多位教师创建的班级
    async fn list_classes_by_teachers(&self, teacher_ids: &[i64]) -> Result<Vec<Class>>;

    /// 班级成员方法
    // 加入班级，重复加入时返回 Conflict
    async fn add_class_member(
        &self,
        class_id: i64,
        student_id: i64,
        student_name: &str,
    ) -> Result<ClassMember>;
    // 获取学生在班级中的成员记录
    async fn get_class_member(&self, class_id: i64, student_id: i64)
    -> Result<Option<ClassMember>>;
    // 列出班级成员
    async fn list_class_members(&self, class_id: i64) -> Result<Vec<ClassMember>>;
    // 列出学生加入的班级
    async fn list_student_classes(&self, student_id: i64) -> Result<Vec<Class>>;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_by_class(&self, class_id: i64) -> Result<Vec<Assignment>>;

    /// 提交管理方法
    // 创建提交，重复提交时返回 Conflict
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission>;
    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>>;
    async fn get_submission_by_file_id(&self, file_id: &str) -> Result<Option<Submission>>;
    // 获取学生对某作业的提交
    async fn get_student_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;
    // 列出班级提交，student_id 为 Some 时只返回该学生的提交
    async fn list_submissions_by_class(
        &self,
        class_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>>;
    async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>>;
    // 批改提交
    async fn review_submission(
        &self,
        submission_id: i64,
        review: SubmissionReview,
    ) -> Result<Option<Submission>>;

    /// 文件管理方法
    async fn create_file_record(&self, file: NewStoredFile) -> Result<StoredFile>;
    async fn get_file_record(&self, file_id: &str) -> Result<Option<StoredFile>>;
    async fn get_file_records(&self, file_ids: &[String]) -> Result<Vec<StoredFile>>;
    async fn delete_file_record(&self, file_id: &str) -> Result<bool>;
    // 分块写入文件内容（database 后端）
    async fn save_file_chunks(&self, file_id: &str, chunks: Vec<Vec<u8>>) -> Result<()>;
    // 按顺序读取文件分块，无分块时返回空列表
    async fn load_file_chunks(&self, file_id: &str) -> Result<Vec<Vec<u8>>>;
    async fn delete_file_chunks(&self, file_id: &str) -> Result<u64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
