use serde::Deserialize;
use ts_rs::TS;

// 创建作业请求（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub class_id: i64,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    // RFC 3339 格式的截止时间
    pub due: Option<String>,
}

// 创建作业（存储层使用）
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub class_id: i64,
    pub teacher_id: i64,
    pub course: String,
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<i64>,
}
