use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::file_store::{FileStore, create_file_store, register::debug_file_store_registry};
use crate::mail::{Mailer, create_mailer};
use crate::session::SessionStore;
use crate::storage::Storage;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub sessions: Arc<SessionStore>,
    pub mailer: Arc<dyn Mailer>,
    pub file_store: Arc<dyn FileStore>,
}

/// 准备服务器启动的上下文
/// 包括存储、会话、邮件和文件存储后端
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // lettre 与数据库驱动共用 rustls，进程内只能安装一次
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        debug_file_store_registry();
        debug!("Debug mode: File store registry is enabled");
    }

    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let sessions = Arc::new(SessionStore::new(config.session.ttl));
    info!("Session store initialized (ttl: {}s)", sessions.ttl_secs());

    let mailer = create_mailer(config)?;

    let file_store = create_file_store(&config.upload.backend, storage.clone()).await?;
    warn!("File storage backend initialized: {}", file_store.name());

    Ok(StartupContext {
        storage,
        sessions,
        mailer,
        file_store,
    })
}
