use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub class_id: i64,
    pub teacher_id: i64,
    // 课程名称
    pub course: String,
    pub title: String,
    pub description: Option<String>,
    // 截止时间，可为空
    pub due: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
