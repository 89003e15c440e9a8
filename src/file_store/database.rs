use std::sync::Arc;

use async_trait::async_trait;

use super::FileStore;
use crate::errors::Result;
use crate::storage::Storage;

/// 单个分块大小，低于常见数据库的 BLOB 单值限制
pub const CHUNK_SIZE: usize = 255 * 1024;

/// 把文件内容分块存进 `file_chunks` 表
pub struct DatabaseFileStore {
    storage: Arc<dyn Storage>,
}

impl DatabaseFileStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl FileStore for DatabaseFileStore {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn put(&self, file_id: &str, data: Vec<u8>) -> Result<()> {
        // 空文件也写一个空分块，读取时才能区分“空文件”和“内容丢失”
        let chunks: Vec<Vec<u8>> = if data.is_empty() {
            vec![Vec::new()]
        } else {
            data.chunks(CHUNK_SIZE).map(|c| c.to_vec()).collect()
        };
        self.storage.save_file_chunks(file_id, chunks).await
    }

    async fn get(&self, file_id: &str) -> Result<Option<Vec<u8>>> {
        let chunks = self.storage.load_file_chunks(file_id).await?;
        if chunks.is_empty() {
            return Ok(None);
        }
        Ok(Some(chunks.concat()))
    }

    async fn delete(&self, file_id: &str) -> Result<()> {
        self.storage.delete_file_chunks(file_id).await?;
        Ok(())
    }
}
