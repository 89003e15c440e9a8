use serde::Deserialize;
use ts_rs::TS;

// 创建班级请求（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct CreateClassRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

// 创建班级（存储层使用）
#[derive(Debug, Clone)]
pub struct NewClass {
    pub teacher_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub join_code: String,
}

// 通过加入码加入班级
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct JoinByCodeRequest {
    #[serde(default)]
    pub code: String,
}

// 按教师姓名搜索班级
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "class.ts")]
pub struct TeacherSearchQuery {
    pub teacher: Option<String>,
}
