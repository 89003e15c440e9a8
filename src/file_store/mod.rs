//! 提交文件的二进制存储
//!
//! 文件元数据（`files` 表）始终在数据库中，这里只负责文件内容。
//! 后端由 `upload.backend` 选择，通过注册表按名称构造。

pub mod database;
pub mod local;
pub mod register;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{PortalError, Result};
use crate::storage::Storage;

pub use register::{get_file_store_plugin, register_file_store_plugin};

#[async_trait]
pub trait FileStore: Send + Sync {
    /// 后端名称，写入文件记录的 backend 字段
    fn name(&self) -> &'static str;

    async fn put(&self, file_id: &str, data: Vec<u8>) -> Result<()>;

    /// 内容不存在时返回 None
    async fn get(&self, file_id: &str) -> Result<Option<Vec<u8>>>;

    /// 删除不存在的内容不视为错误
    async fn delete(&self, file_id: &str) -> Result<()>;
}

/// 按名称创建文件存储后端
pub async fn create_file_store(
    backend: &str,
    storage: Arc<dyn Storage>,
) -> Result<Arc<dyn FileStore>> {
    let constructor = get_file_store_plugin(backend).ok_or_else(|| {
        PortalError::file_store_plugin_not_found(format!("Unknown file storage backend: {backend}"))
    })?;
    let store = constructor(storage).await?;
    Ok(Arc::from(store))
}
