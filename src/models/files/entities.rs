use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct StoredFile {
    // 文件的唯一标识符（UUID）
    pub id: String,
    // 原始文件名
    pub original_name: String,
    // MIME 类型
    pub content_type: String,
    // 文件大小（以字节为单位）
    pub size: i64,
    // 存储后端名称
    pub backend: String,
    // 上传者ID
    pub uploader_id: i64,
    // 上传时间
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}
