use crate::errors::Result;
use crate::file_store::FileStore;
use crate::storage::Storage;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxedFileStoreFuture = Pin<Box<dyn Future<Output = Result<Box<dyn FileStore>>> + Send>>;
pub type FileStoreConstructor = Arc<dyn Fn(Arc<dyn Storage>) -> BoxedFileStoreFuture + Send + Sync>;

static FILE_STORE_REGISTRY: Lazy<RwLock<HashMap<String, FileStoreConstructor>>> =
    Lazy::new(|| {
        let mut builtins: HashMap<String, FileStoreConstructor> = HashMap::new();
        builtins.insert(
            "database".to_string(),
            Arc::new(|storage: Arc<dyn Storage>| -> BoxedFileStoreFuture {
                Box::pin(async move {
                    Ok(Box::new(super::database::DatabaseFileStore::new(storage))
                        as Box<dyn FileStore>)
                })
            }),
        );
        builtins.insert(
            "local".to_string(),
            Arc::new(|_storage: Arc<dyn Storage>| -> BoxedFileStoreFuture {
                Box::pin(async move {
                    let store = super::local::LocalFileStore::from_config().await?;
                    Ok(Box::new(store) as Box<dyn FileStore>)
                })
            }),
        );
        RwLock::new(builtins)
    });

pub fn register_file_store_plugin<S: Into<String>>(name: S, constructor: FileStoreConstructor) {
    let name = name.into();
    let mut registry = FILE_STORE_REGISTRY
        .write()
        .expect("File store registry lock poisoned");
    registry.insert(name, constructor);
}

pub fn get_file_store_plugin(name: &str) -> Option<FileStoreConstructor> {
    FILE_STORE_REGISTRY
        .read()
        .expect("File store registry lock poisoned")
        .get(name)
        .cloned()
}

pub fn debug_file_store_registry() {
    let registry = FILE_STORE_REGISTRY
        .read()
        .expect("File store registry lock poisoned");
    tracing::debug!("Registered file store plugins:");
    for key in registry.keys() {
        tracing::debug!(" - {}", key);
    }
}
