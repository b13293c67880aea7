use super::embedded::SledDocumentStore;
use super::in_memory::InMemoryDocumentStore;
use super::mongo::MongoDocumentStore;
use domain::store::{DocumentStore, StoreError};
use log::info;
use std::sync::Arc;

/// 根据连接串的协议选择文档存储实现
///
/// - `mongodb://` / `mongodb+srv://`: MongoDB
/// - `sled://<path>`: 嵌入式 sled 数据库
/// - `memory://`: 进程内存储
#[derive(Debug, Clone)]
pub struct DocumentStoreFactory {
    database_name: String,
}

impl DocumentStoreFactory {
    pub fn new(database_name: &str) -> Self {
        Self {
            database_name: database_name.to_string(),
        }
    }

    pub async fn connect(&self, url: &str) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| StoreError::UnsupportedUrl(url.to_string()))?;
        match scheme {
            "mongodb" | "mongodb+srv" => {
                let store = MongoDocumentStore::connect(url, &self.database_name).await?;
                Ok(Arc::new(store))
            }
            "sled" if !rest.is_empty() => {
                info!("Opening embedded document store at {}", rest);
                Ok(Arc::new(SledDocumentStore::open(rest)?))
            }
            "memory" => {
                info!("Using in-memory document store, data is lost on exit");
                Ok(Arc::new(InMemoryDocumentStore::new()))
            }
            _ => Err(StoreError::UnsupportedUrl(url.to_string())),
        }
    }
}
