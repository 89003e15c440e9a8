//! 用户存储操作

use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{PortalError, Result};
use crate::models::users::{
    entities::{User, UserRole, join_roles},
    requests::CreateUserRequest,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            roles: Set(req.role.to_string()),
            reset_code_tries: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::from_db(e, "创建用户失败"))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量获取用户
    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Users::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 列出拥有某角色的用户
    pub async fn list_users_with_role_impl(&self, role: UserRole) -> Result<Vec<User>> {
        // 角色名来自枚举，不含通配符，可以直接用于 LIKE
        let result = Users::find()
            .filter(Column::Roles.contains(role.as_str()))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| m.into_user())
            .filter(|u| u.has_role(role))
            .collect())
    }

    /// 追加角色
    pub async fn add_user_role_impl(
        &self,
        id: i64,
        role: UserRole,
        name: Option<String>,
    ) -> Result<Option<User>> {
        let Some(existing) = self.get_user_by_id_impl(id).await? else {
            return Ok(None);
        };

        let mut roles = existing.roles.clone();
        if !roles.contains(&role) {
            roles.push(role);
        }

        let mut model = ActiveModel {
            id: Set(id),
            roles: Set(join_roles(&roles)),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = name {
            model.name = Set(name);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新用户角色失败: {e}")))?;

        self.get_user_by_id_impl(id).await
    }

    /// 更新密码哈希
    pub async fn update_password_hash_impl(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::PasswordHash, Expr::value(password_hash))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新密码失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(
                Column::LastLogin,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 写入验证码
    pub async fn set_reset_code_impl(
        &self,
        id: i64,
        code_hash: &str,
        expires_at: i64,
    ) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::ResetCodeHash, Expr::value(code_hash))
            .col_expr(Column::ResetCodeExpiresAt, Expr::value(expires_at))
            .col_expr(Column::ResetCodeTries, Expr::value(0))
            .col_expr(Column::ResetToken, Expr::value(Option::<String>::None))
            .col_expr(Column::ResetTokenExpiresAt, Expr::value(Option::<i64>::None))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("写入验证码失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 消耗一次验证机会（比较并交换）
    pub async fn consume_reset_attempt_impl(&self, id: i64, expected_tries: i32) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::ResetCodeTries, Expr::value(expected_tries + 1))
            .filter(Column::Id.eq(id))
            .filter(Column::ResetCodeTries.eq(expected_tries))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新验证次数失败: {e}")))?;

        Ok(result.rows_affected == 1)
    }

    /// 写入重置令牌并清除验证码
    pub async fn set_reset_token_impl(&self, id: i64, token: &str, expires_at: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::ResetCodeHash, Expr::value(Option::<String>::None))
            .col_expr(Column::ResetCodeExpiresAt, Expr::value(Option::<i64>::None))
            .col_expr(Column::ResetCodeTries, Expr::value(0))
            .col_expr(Column::ResetToken, Expr::value(token))
            .col_expr(Column::ResetTokenExpiresAt, Expr::value(expires_at))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("写入重置令牌失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 通过重置令牌获取用户
    pub async fn get_user_by_reset_token_impl(&self, token: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::ResetToken.eq(token))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 完成密码重置
    pub async fn complete_password_reset_impl(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::PasswordHash, Expr::value(password_hash))
            .col_expr(Column::ResetCodeHash, Expr::value(Option::<String>::None))
            .col_expr(Column::ResetCodeExpiresAt, Expr::value(Option::<i64>::None))
            .col_expr(Column::ResetCodeTries, Expr::value(0))
            .col_expr(Column::ResetToken, Expr::value(Option::<String>::None))
            .col_expr(Column::ResetTokenExpiresAt, Expr::value(Option::<i64>::None))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("重置密码失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
