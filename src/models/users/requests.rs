use super::entities::UserRole;

// 创建用户（存储层使用，密码已哈希）
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}
