use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "class_member.ts")]
pub struct ClassMember {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}
