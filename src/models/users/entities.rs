use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "user.ts")]
pub enum UserRole {
    Student, // 学生
    Teacher, // 教师
}

impl UserRole {
    pub const STUDENT: &'static str = "student";
    pub const TEACHER: &'static str = "teacher";

    pub fn teacher_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher]
    }
    pub fn student_roles() -> &'static [&'static UserRole] {
        &[&Self::Student]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[&Self::Student, &Self::Teacher]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => UserRole::STUDENT,
            UserRole::Teacher => UserRole::TEACHER,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid user role: '{s}'. Supported roles: student, teacher"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            UserRole::STUDENT => Ok(UserRole::Student),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

/// 解析数据库中逗号分隔的角色列表，忽略无法识别的项
pub fn parse_roles(raw: &str) -> Vec<UserRole> {
    let mut roles = Vec::new();
    for role in raw.split(',').filter_map(|r| r.parse::<UserRole>().ok()) {
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    roles
}

pub fn join_roles(roles: &[UserRole]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

// 密码重置流程状态（不对外暴露）
#[derive(Debug, Clone, Default)]
pub struct PasswordResetState {
    pub code_hash: Option<String>,
    pub code_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub code_tries: i32,
    pub token: Option<String>,
    pub token_expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub roles: Vec<UserRole>,
    #[serde(skip)]
    #[ts(skip)]
    pub reset: PasswordResetState,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!(
            parse_roles("student,teacher"),
            vec![UserRole::Student, UserRole::Teacher]
        );
        assert_eq!(parse_roles("teacher, admin ,teacher"), vec![UserRole::Teacher]);
        assert!(parse_roles("").is_empty());
    }

    #[test]
    fn test_join_roles() {
        assert_eq!(
            join_roles(&[UserRole::Teacher, UserRole::Student]),
            "teacher,student"
        );
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Student".parse::<UserRole>(), Ok(UserRole::Student));
        assert!("admin".parse::<UserRole>().is_err());
    }
}
