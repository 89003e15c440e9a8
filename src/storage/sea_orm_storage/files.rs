//! 文件存储操作

use super::SeaOrmStorage;
use crate::entity::file_chunks::{
    ActiveModel as ChunkActiveModel, Column as ChunkColumn, Entity as FileChunks,
};
use crate::entity::files::{ActiveModel, Column, Entity as Files};
use crate::errors::{PortalError, Result};
use crate::models::files::{entities::StoredFile, requests::NewStoredFile};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建文件记录
    pub async fn create_file_record_impl(&self, req: NewStoredFile) -> Result<StoredFile> {
        let model = ActiveModel {
            id: Set(req.id),
            original_name: Set(req.original_name),
            content_type: Set(req.content_type),
            size: Set(req.size),
            backend: Set(req.backend),
            uploader_id: Set(req.uploader_id),
            uploaded_at: Set(chrono::Utc::now().timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::from_db(e, "创建文件记录失败"))?;

        Ok(result.into_stored_file())
    }

    /// 通过 ID 获取文件记录
    pub async fn get_file_record_impl(&self, file_id: &str) -> Result<Option<StoredFile>> {
        let result = Files::find_by_id(file_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询文件失败: {e}")))?;

        Ok(result.map(|m| m.into_stored_file()))
    }

    /// 批量获取文件记录
    pub async fn get_file_records_impl(&self, file_ids: &[String]) -> Result<Vec<StoredFile>> {
        if file_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Files::find()
            .filter(Column::Id.is_in(file_ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("批量查询文件失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_stored_file()).collect())
    }

    /// 删除文件记录
    pub async fn delete_file_record_impl(&self, file_id: &str) -> Result<bool> {
        let result = Files::delete_by_id(file_id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除文件记录失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 在一个事务中写入全部分块
    pub async fn save_file_chunks_impl(&self, file_id: &str, chunks: Vec<Vec<u8>>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        for (seq, data) in chunks.into_iter().enumerate() {
            ChunkActiveModel {
                file_id: Set(file_id.to_string()),
                seq: Set(seq as i32),
                data: Set(data),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| PortalError::from_db(e, "写入文件分块失败"))?;
        }

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(())
    }

    /// 按顺序读取分块
    pub async fn load_file_chunks_impl(&self, file_id: &str) -> Result<Vec<Vec<u8>>> {
        let result = FileChunks::find()
            .filter(ChunkColumn::FileId.eq(file_id))
            .order_by_asc(ChunkColumn::Seq)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("读取文件分块失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.data).collect())
    }

    /// 删除文件分块
    pub async fn delete_file_chunks_impl(&self, file_id: &str) -> Result<u64> {
        let result = FileChunks::delete_many()
            .filter(ChunkColumn::FileId.eq(file_id))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除文件分块失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
