//! 用户实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    // 逗号分隔的角色列表，如 "student,teacher"
    pub roles: String,
    pub reset_code_hash: Option<String>,
    pub reset_code_expires_at: Option<i64>,
    pub reset_code_tries: i32,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<i64>,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::classes::Entity")]
    Classes,
    #[sea_orm(has_many = "super::class_members::Entity")]
    ClassMembers,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
    #[sea_orm(has_many = "super::files::Entity")]
    Files,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classes.def()
    }
}

impl Related<super::class_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassMembers.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_user(self) -> crate::models::users::entities::User {
        use crate::models::users::entities::{PasswordResetState, User, parse_roles};
        use chrono::{DateTime, Utc};

        let to_datetime =
            |ts: i64| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default();

        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            roles: parse_roles(&self.roles),
            reset: PasswordResetState {
                code_hash: self.reset_code_hash,
                code_expires_at: self.reset_code_expires_at.map(to_datetime),
                code_tries: self.reset_code_tries,
                token: self.reset_token,
                token_expires_at: self.reset_token_expires_at.map(to_datetime),
            },
            last_login: self.last_login.map(to_datetime),
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
