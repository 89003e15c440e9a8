use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::FileStore;
use crate::config::AppConfig;
use crate::errors::{PortalError, Result};

/// 把文件内容写到本地目录，按 ID 前两位分子目录
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub async fn from_config() -> Result<Self> {
        Self::new(&AppConfig::get().upload.dir).await
    }

    fn path_for(&self, file_id: &str) -> Result<PathBuf> {
        // ID 只允许十六进制与连字符，避免路径穿越
        if file_id.len() < 2 || !file_id.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(PortalError::file_operation(format!(
                "Invalid file id: {file_id}"
            )));
        }
        Ok(self.root.join(&file_id[..2]).join(file_id))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn put(&self, file_id: &str, data: Vec<u8>) -> Result<()> {
        let path = self.path_for(file_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        Ok(())
    }

    async fn get(&self, file_id: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(file_id)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, file_id: &str) -> Result<()> {
        let path = self.path_for(file_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_local_round_trip() {
        let root = std::env::temp_dir().join(format!("portal-files-{}", uuid::Uuid::new_v4()));
        let store = LocalFileStore::new(&root).await.expect("root should be created");
        let id = uuid::Uuid::new_v4().to_string();

        store.put(&id, b"hello".to_vec()).await.expect("put should succeed");
        assert_eq!(
            store.get(&id).await.expect("get should succeed"),
            Some(b"hello".to_vec())
        );

        store.delete(&id).await.expect("delete should succeed");
        store.delete(&id).await.expect("second delete should succeed");
        assert_eq!(store.get(&id).await.expect("get should succeed"), None);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[actix_web::test]
    async fn test_rejects_path_traversal() {
        let root = std::env::temp_dir().join(format!("portal-files-{}", uuid::Uuid::new_v4()));
        let store = LocalFileStore::new(&root).await.expect("root should be created");
        assert!(store.get("../../etc/passwd").await.is_err());
        let _ = std::fs::remove_dir_all(&root);
    }
}
