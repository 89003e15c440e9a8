//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod class_members;
mod classes;
mod files;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{PortalError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
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
        let db_url = Self::build_database_url(&config.database_url())?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::migrate(&db).await?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 创建内存 SQLite 存储（单连接，连接关闭即数据丢失）
    pub async fn in_memory() -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        Self::migrate(&db).await?;
        Ok(Self { db })
    }

    /// 运行迁移
    async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(PortalError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn list_users_with_role(&self, role: UserRole) -> Result<Vec<User>> {
        self.list_users_with_role_impl(role).await
    }

    async fn add_user_role(
        &self,
        id: i64,
        role: UserRole,
        name: Option<String>,
    ) -> Result<Option<User>> {
        self.add_user_role_impl(id, role, name).await
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<bool> {
        self.update_password_hash_impl(id, password_hash).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    // 密码重置模块
    async fn set_reset_code(&self, id: i64, code_hash: &str, expires_at: i64) -> Result<bool> {
        self.set_reset_code_impl(id, code_hash, expires_at).await
    }

    async fn consume_reset_attempt(&self, id: i64, expected_tries: i32) -> Result<bool> {
        self.consume_reset_attempt_impl(id, expected_tries).await
    }

    async fn set_reset_token(&self, id: i64, token: &str, expires_at: i64) -> Result<bool> {
        self.set_reset_token_impl(id, token, expires_at).await
    }

    async fn get_user_by_reset_token(&self, token: &str) -> Result<Option<User>> {
        self.get_user_by_reset_token_impl(token).await
    }

    async fn complete_password_reset(&self, id: i64, password_hash: &str) -> Result<bool> {
        self.complete_password_reset_impl(id, password_hash).await
    }

    // 班级模块
    async fn create_class(&self, class: NewClass) -> Result<Class> {
        self.create_class_impl(class).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_code(&self, code: &str) -> Result<Option<Class>> {
        self.get_class_by_code_impl(code).await
    }

    async fn list_classes_by_teacher(&self, teacher_id: i64) -> Result<Vec<Class>> {
        self.list_classes_by_teacher_impl(teacher_id).await
    }

    async fn list_classes_by_teachers(&self, teacher_ids: &[i64]) -> Result<Vec<Class>> {
        self.list_classes_by_teachers_impl(teacher_ids).await
    }

    // 班级成员模块
    async fn add_class_member(
        &self,
        class_id: i64,
        student_id: i64,
        student_name: &str,
    ) -> Result<ClassMember> {
        self.add_class_member_impl(class_id, student_id, student_name)
            .await
    }

    async fn get_class_member(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Result<Option<ClassMember>> {
        self.get_class_member_impl(class_id, student_id).await
    }

    async fn list_class_members(&self, class_id: i64) -> Result<Vec<ClassMember>> {
        self.list_class_members_impl(class_id).await
    }

    async fn list_student_classes(&self, student_id: i64) -> Result<Vec<Class>> {
        self.list_student_classes_impl(student_id).await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(assignment_id).await
    }

    async fn list_assignments_by_class(&self, class_id: i64) -> Result<Vec<Assignment>> {
        self.list_assignments_by_class_impl(class_id).await
    }

    // 提交模块
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission> {
        self.create_submission_impl(submission).await
    }

    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(submission_id).await
    }

    async fn get_submission_by_file_id(&self, file_id: &str) -> Result<Option<Submission>> {
        self.get_submission_by_file_id_impl(file_id).await
    }

    async fn get_student_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        self.get_student_submission_impl(assignment_id, student_id)
            .await
    }

    async fn list_submissions_by_class(
        &self,
        class_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_class_impl(class_id, student_id)
            .await
    }

    async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>> {
        self.list_submissions_by_student_impl(student_id).await
    }

    async fn review_submission(
        &self,
        submission_id: i64,
        review: SubmissionReview,
    ) -> Result<Option<Submission>> {
        self.review_submission_impl(submission_id, review).await
    }

    // 文件模块
    async fn create_file_record(&self, file: NewStoredFile) -> Result<StoredFile> {
        self.create_file_record_impl(file).await
    }

    async fn get_file_record(&self, file_id: &str) -> Result<Option<StoredFile>> {
        self.get_file_record_impl(file_id).await
    }

    async fn get_file_records(&self, file_ids: &[String]) -> Result<Vec<StoredFile>> {
        self.get_file_records_impl(file_ids).await
    }

    async fn delete_file_record(&self, file_id: &str) -> Result<bool> {
        self.delete_file_record_impl(file_id).await
    }

    async fn save_file_chunks(&self, file_id: &str, chunks: Vec<Vec<u8>>) -> Result<()> {
        self.save_file_chunks_impl(file_id, chunks).await
    }

    async fn load_file_chunks(&self, file_id: &str) -> Result<Vec<Vec<u8>>> {
        self.load_file_chunks_impl(file_id).await
    }

    async fn delete_file_chunks(&self, file_id: &str) -> Result<u64> {
        self.delete_file_chunks_impl(file_id).await
    }
}
