// 新文件记录（存储层使用）
#[derive(Debug, Clone)]
pub struct NewStoredFile {
    pub id: String,
    pub original_name: String,
    pub content_type: String,
    pub size: i64,
    pub backend: String,
    pub uploader_id: i64,
}
