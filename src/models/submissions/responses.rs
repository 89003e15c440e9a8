use serde::Serialize;
use ts_rs::TS;

use super::entities::Submission;
use crate::models::files::entities::StoredFile;

/// 提交列表项（包含学生姓名与文件信息）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionListItem {
    pub submission: Submission,
    pub student_name: String,
    pub file: Option<StoredFile>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionListResponse {
    pub items: Vec<SubmissionListItem>,
}
