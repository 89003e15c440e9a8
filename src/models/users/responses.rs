use serde::Serialize;
use ts_rs::TS;

use super::entities::{User, UserRole};

// 对外公开的用户信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roles: Vec<UserRole>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            roles: user.roles,
        }
    }
}
